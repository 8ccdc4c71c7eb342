//! Profile-level toggle: upgrades over an existing file may be forbidden

use tracing::debug;

use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

pub struct UpgradeAllowedSpecification;

impl Specification for UpgradeAllowedSpecification {
    fn name(&self) -> &'static str {
        "UpgradeAllowed"
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

        if profile.upgrade_allowed {
            return Ok(SpecDecision::Accept);
        }

        let candidate_index = profile.index_of(candidate.parsed.quality.quality);
        let would_upgrade = candidate
            .works
            .iter()
            .flat_map(|w| w.files.iter())
            .any(|file| candidate_index > profile.index_of(file.quality.quality));

        if would_upgrade {
            debug!(profile = %profile.name, "Upgrades disabled by profile");
            return Ok(SpecDecision::reject(
                "Existing file and upgrades are not allowed in the profile",
            ));
        }

        Ok(SpecDecision::Accept)
    }
}
