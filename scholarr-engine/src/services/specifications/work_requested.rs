//! During a work-scoped search, the resolved work must be one of those
//! searched for
//!
//! When no works could be resolved, a DOI match against the search target
//! is the only acceptable substitute, and even then the parsed title (if
//! any) must bear some resemblance to a target title.

use std::collections::HashSet;
use tracing::debug;

use crate::services::doi;
use crate::types::{CandidateMatch, SearchCriteria, SpecDecision, SpecError, Specification};

/// Minimum parsed-title similarity when a DOI match substitutes for work
/// resolution
const DOI_TITLE_SIMILARITY: f64 = 0.5;
/// Minimum parsed-title similarity when works resolved by id intersection
const RESOLVED_TITLE_SIMILARITY: f64 = 0.6;

pub struct WorkRequestedSpecification;

impl Specification for WorkRequestedSpecification {
    fn name(&self) -> &'static str {
        "WorkRequested"
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError> {
        let Some(criteria) = criteria else {
            return Ok(SpecDecision::Accept);
        };
        if criteria.works.is_empty() {
            return Ok(SpecDecision::Accept);
        }

        if candidate.works.is_empty() {
            if criteria.interactive {
                debug!("No works resolved for interactive search");
                return Ok(SpecDecision::reject("Unable to parse works from release name"));
            }

            if doi::is_match(&candidate.release, criteria) {
                if let Some(parsed_title) = candidate.parsed.work_title.as_deref() {
                    if !title_matches(parsed_title, criteria, DOI_TITLE_SIMILARITY) {
                        return Ok(SpecDecision::reject(
                            "Parsed title doesn't match search criteria even though DOI matches",
                        ));
                    }
                }
                debug!("No works resolved but DOI matches search target");
                return Ok(SpecDecision::Accept);
            }

            return Ok(SpecDecision::reject(
                "Unable to parse works from release name and no DOI match",
            ));
        }

        let requested = candidate
            .works
            .iter()
            .any(|work| criteria.works.iter().any(|target| target.id == work.id));
        if !requested {
            debug!("Resolved works are not the searched works");
            return Ok(SpecDecision::reject("Work wasn't requested"));
        }

        // Guard against resolution having fallen back to the target list
        // when the parsed title names something else
        if let Some(parsed_title) = candidate.parsed.work_title.as_deref() {
            if !title_matches(parsed_title, criteria, RESOLVED_TITLE_SIMILARITY) {
                return Ok(SpecDecision::reject(
                    "Parsed title doesn't match search criteria",
                ));
            }
        }

        Ok(SpecDecision::Accept)
    }
}

fn title_matches(parsed_title: &str, criteria: &SearchCriteria, threshold: f64) -> bool {
    let parsed = title_words(parsed_title);

    criteria.works.iter().any(|work| {
        let target = title_words(&work.title);
        if parsed.is_empty() || target.is_empty() {
            return false;
        }
        let common = parsed.intersection(&target).count() as f64;
        common / parsed.len().max(target.len()) as f64 >= threshold
    })
}

fn title_words(title: &str) -> HashSet<String> {
    title
        .split(|c: char| " .,_-=()[]|\"`'".contains(c))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParsedReleaseInfo;
    use scholarr_common::models::{Author, AuthorKind, Link, ReleaseInfo, Work};

    fn setup(work_title: &str) -> (Author, Work) {
        let author = Author::with_name("Jane Doe", AuthorKind::Person);
        let mut work = Work::with_title(author.id, work_title);
        work.links.push(Link {
            name: "doi".to_string(),
            url: "10.1038/nature12373".to_string(),
        });
        (author, work)
    }

    fn criteria(work: &Work, interactive: bool) -> SearchCriteria {
        SearchCriteria {
            author: None,
            works: vec![work.clone()],
            interactive,
            ..Default::default()
        }
    }

    fn candidate(works: Vec<Work>, parsed_title: Option<&str>, release_doi: Option<&str>) -> CandidateMatch {
        let mut release = ReleaseInfo::with_title("test");
        release.doi = release_doi.map(str::to_string);

        let mut candidate = CandidateMatch::bare(
            release,
            ParsedReleaseInfo {
                work_title: parsed_title.map(str::to_string),
                ..Default::default()
            },
        );
        candidate.works = works;
        candidate
    }

    #[test]
    fn test_accepts_resolved_target_work() {
        let (_, work) = setup("Deep Learning Methods");
        let decision = WorkRequestedSpecification
            .evaluate(
                &candidate(vec![work.clone()], Some("Deep Learning Methods"), None),
                Some(&criteria(&work, false)),
            )
            .unwrap();
        assert_eq!(decision, SpecDecision::Accept);
    }

    #[test]
    fn test_rejects_unrequested_work() {
        let (author, work) = setup("Deep Learning Methods");
        let other = Work::with_title(author.id, "Something Else");

        let decision = WorkRequestedSpecification
            .evaluate(
                &candidate(vec![other], None, None),
                Some(&criteria(&work, false)),
            )
            .unwrap();
        assert_eq!(decision, SpecDecision::reject("Work wasn't requested"));
    }

    #[test]
    fn test_interactive_search_rejects_unresolved() {
        let (_, work) = setup("Deep Learning Methods");
        let decision = WorkRequestedSpecification
            .evaluate(
                &candidate(vec![], None, Some("10.1038/nature12373")),
                Some(&criteria(&work, true)),
            )
            .unwrap();
        assert_eq!(
            decision,
            SpecDecision::reject("Unable to parse works from release name")
        );
    }

    #[test]
    fn test_doi_match_substitutes_for_resolution() {
        let (_, work) = setup("Deep Learning Methods");
        let decision = WorkRequestedSpecification
            .evaluate(
                &candidate(vec![], None, Some("10.1038/nature12373")),
                Some(&criteria(&work, false)),
            )
            .unwrap();
        assert_eq!(decision, SpecDecision::Accept);
    }

    #[test]
    fn test_doi_match_still_needs_plausible_title() {
        let (_, work) = setup("Deep Learning Methods");
        let decision = WorkRequestedSpecification
            .evaluate(
                &candidate(
                    vec![],
                    Some("Completely Unrelated Cookbook"),
                    Some("10.1038/nature12373"),
                ),
                Some(&criteria(&work, false)),
            )
            .unwrap();
        assert!(matches!(decision, SpecDecision::Reject(_)));
    }

    #[test]
    fn test_no_resolution_and_no_doi_rejects() {
        let (_, work) = setup("Deep Learning Methods");
        let decision = WorkRequestedSpecification
            .evaluate(&candidate(vec![], None, None), Some(&criteria(&work, false)))
            .unwrap();
        assert_eq!(
            decision,
            SpecDecision::reject("Unable to parse works from release name and no DOI match")
        );
    }
}
