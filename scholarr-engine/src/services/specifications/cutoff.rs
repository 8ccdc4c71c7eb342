//! Stop grabbing once every on-disk file meets the profile cutoff

use tracing::debug;

use crate::services::upgradable::UpgradeService;
use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

pub struct CutoffSpecification {
    upgrade: UpgradeService,
}

impl CutoffSpecification {
    pub fn new(upgrade: UpgradeService) -> Self {
        Self { upgrade }
    }
}

impl Specification for CutoffSpecification {
    fn name(&self) -> &'static str {
        "Cutoff"
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        _criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError> {
        let Some(author) = candidate.author.as_ref() else {
            return Ok(SpecDecision::Accept);
        };
        let profile = &author.quality_profile;

        let files: Vec<_> = candidate.works.iter().flat_map(|w| w.files.iter()).collect();
        if files.is_empty() {
            return Ok(SpecDecision::Accept);
        }

        for file in &files {
            if self
                .upgrade
                .cutoff_not_met(profile, file.quality, file.format_score)
            {
                return Ok(SpecDecision::Accept);
            }

            // A proper over an at-cutoff file is still wanted
            if self
                .upgrade
                .is_revision_upgrade(file.quality, candidate.parsed.quality)
            {
                return Ok(SpecDecision::Accept);
            }
        }

        debug!(
            cutoff = %profile.cutoff,
            files = files.len(),
            "Existing files already meet cutoff"
        );
        Ok(SpecDecision::reject(format!(
            "Existing file meets cutoff: {}",
            profile.cutoff.name()
        )))
    }
}
