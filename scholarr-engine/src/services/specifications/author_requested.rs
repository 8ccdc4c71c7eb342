//! During an author-scoped search, the resolved author must be the one
//! searched for
//!
//! Journal handling: papers carry both a venue and a byline, so a release
//! resolved to a journal is acceptable for a person-author search, but a
//! journal search never accepts a plain person match.

use tracing::debug;

use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

pub struct AuthorRequestedSpecification;

impl Specification for AuthorRequestedSpecification {
    fn name(&self) -> &'static str {
        "AuthorRequested"
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError> {
        let Some(searched) = criteria.and_then(|c| c.author.as_ref()) else {
            return Ok(SpecDecision::Accept);
        };

        let resolved = candidate.author.as_ref();
        let resolved_is_journal = resolved.is_some_and(|a| a.is_journal());
        let searched_is_journal = searched.is_journal();

        if resolved_is_journal && searched_is_journal {
            return match resolved {
                Some(journal) if journal.id == searched.id => Ok(SpecDecision::Accept),
                _ => {
                    debug!(searched = %searched.name, "Resolved to a different journal");
                    Ok(SpecDecision::reject("Wrong journal"))
                }
            };
        }

        if searched_is_journal && !resolved_is_journal {
            return Ok(SpecDecision::reject("Wrong author type, expected journal"));
        }

        if resolved_is_journal && !searched_is_journal {
            // A venue match is enough; the byline is checked by the work
            // rules, multi-author papers would otherwise never match
            return Ok(SpecDecision::Accept);
        }

        match resolved {
            None => Ok(SpecDecision::reject("Release has no author")),
            Some(author) if author.id == searched.id => Ok(SpecDecision::Accept),
            Some(author) => {
                debug!(resolved = %author.name, searched = %searched.name, "Wrong author");
                Ok(SpecDecision::reject("Wrong author"))
            }
        }
    }
}
