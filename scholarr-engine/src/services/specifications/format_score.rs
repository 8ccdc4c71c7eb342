//! Custom-format score must reach the profile's minimum

use tracing::debug;

use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

pub struct FormatScoreSpecification;

impl Specification for FormatScoreSpecification {
    fn name(&self) -> &'static str {
        "CustomFormatAllowedByProfile"
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        _criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError> {
        let Some(author) = candidate.author.as_ref() else {
            return Ok(SpecDecision::Accept);
        };

        // No configured minimum means the profile doesn't care
        let Some(min) = author.quality_profile.min_format_score else {
            return Ok(SpecDecision::Accept);
        };

        if candidate.custom_format_score < min {
            debug!(
                score = candidate.custom_format_score,
                min, "Custom format score below profile minimum"
            );
            return Ok(SpecDecision::reject(format!(
                "Custom format score {} is below profile minimum {}",
                candidate.custom_format_score, min
            )));
        }

        Ok(SpecDecision::Accept)
    }
}
