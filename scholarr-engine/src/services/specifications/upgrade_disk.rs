//! Candidate must strictly improve on every on-disk file
//!
//! Sits in the disk priority group so it only runs when the cheaper rules
//! all passed.

use tracing::debug;

use crate::services::upgradable::UpgradeService;
use crate::types::{
    CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification, SpecificationPriority,
};

pub struct UpgradeDiskSpecification {
    upgrade: UpgradeService,
}

impl UpgradeDiskSpecification {
    pub fn new(upgrade: UpgradeService) -> Self {
        Self { upgrade }
    }
}

impl Specification for UpgradeDiskSpecification {
    fn name(&self) -> &'static str {
        "UpgradeDisk"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Disk
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

        for file in candidate.works.iter().flat_map(|w| w.files.iter()) {
            if !self.upgrade.is_upgradable(
                profile,
                file.quality,
                file.format_score,
                candidate.parsed.quality,
                candidate.custom_format_score,
            ) {
                debug!(
                    existing = %file.quality,
                    candidate = %candidate.parsed.quality,
                    "Not an upgrade over existing file"
                );
                return Ok(SpecDecision::reject(format!(
                    "Not an upgrade for existing file. Existing quality: {}",
                    file.quality
                )));
            }
        }

        Ok(SpecDecision::Accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParsedReleaseInfo;
    use scholarr_common::models::{
        Author, AuthorKind, Quality, QualityModel, ReleaseInfo, Work, WorkFile,
    };
    use uuid::Uuid;

    fn candidate(file_quality: Quality, candidate_quality: Quality) -> CandidateMatch {
        let author = Author::with_name("Jane Doe", AuthorKind::Person);
        let mut work = Work::with_title(author.id, "A Paper");
        work.files.push(WorkFile {
            id: Uuid::new_v4(),
            work_id: work.id,
            quality: QualityModel::new(file_quality),
            format_score: 0,
        });

        let mut candidate = CandidateMatch::bare(
            ReleaseInfo::with_title("test"),
            ParsedReleaseInfo {
                quality: QualityModel::new(candidate_quality),
                ..Default::default()
            },
        );
        candidate.author = Some(author);
        candidate.works = vec![work];
        candidate
    }

    fn spec() -> UpgradeDiskSpecification {
        UpgradeDiskSpecification::new(UpgradeService::new(true))
    }

    #[test]
    fn test_runs_in_disk_group() {
        assert_eq!(spec().priority(), SpecificationPriority::Disk);
    }

    #[test]
    fn test_accepts_strict_upgrade() {
        assert_eq!(
            spec()
                .evaluate(&candidate(Quality::Pdf, Quality::Epub), None)
                .unwrap(),
            SpecDecision::Accept
        );
    }

    #[test]
    fn test_rejects_sidegrade_and_downgrade() {
        assert!(matches!(
            spec()
                .evaluate(&candidate(Quality::Epub, Quality::Epub), None)
                .unwrap(),
            SpecDecision::Reject(_)
        ));
        assert!(matches!(
            spec()
                .evaluate(&candidate(Quality::Epub, Quality::Pdf), None)
                .unwrap(),
            SpecDecision::Reject(_)
        ));
    }
}
