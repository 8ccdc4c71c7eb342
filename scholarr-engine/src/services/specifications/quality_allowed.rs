//! Quality tier must be enabled in the owning author's profile

use scholarr_common::models::Quality;
use tracing::debug;

use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

pub struct QualityAllowedSpecification;

impl Specification for QualityAllowedSpecification {
    fn name(&self) -> &'static str {
        "QualityAllowedByProfile"
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        _criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError> {
        let Some(author) = candidate.author.as_ref() else {
            return Ok(SpecDecision::Accept);
        };

        let quality = candidate.parsed.quality.quality;
        if quality == Quality::Unknown {
            return Ok(SpecDecision::Accept);
        }

        match author.quality_profile.is_allowed(quality) {
            Some(false) => {
                debug!(%quality, profile = %author.quality_profile.name, "Quality not allowed");
                Ok(SpecDecision::reject(format!(
                    "{} is not wanted in profile",
                    quality.name()
                )))
            }
            // Unlisted tiers fail open
            _ => Ok(SpecDecision::Accept),
        }
    }
}
