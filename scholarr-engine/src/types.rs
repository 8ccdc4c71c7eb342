//! Core types and trait definitions for the evaluation engine
//!
//! Defines the per-release evaluation types:
//! - `ParsedReleaseInfo`: structured decomposition of a release title
//! - `SearchCriteria`: the target of an active search
//! - `CandidateMatch`: a release bound to catalog identity
//! - `Rejection` / `Decision`: the outcome of evaluating one candidate
//! - `Specification`: one accept/reject rule in the decision chain

use scholarr_common::models::{Author, QualityModel, ReleaseInfo, ReleaseSource, Work};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured decomposition of a release title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReleaseInfo {
    pub author_name: Option<String>,
    pub work_title: Option<String>,
    pub quality: QualityModel,
    /// True for date-range requests spanning an author's output
    pub discography: bool,
    /// Inclusive year bounds for discography requests; 0 = unbounded
    pub discography_start: i32,
    pub discography_end: i32,
    pub disambiguation: Option<String>,
}

impl ParsedReleaseInfo {
    /// True when the parsed author name is usable for identity resolution
    pub fn has_author(&self) -> bool {
        self.author_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty() && !name.to_lowercase().starts_with("unknown"))
    }
}

/// The specific author/work(s) an active search is targeting
///
/// `None` criteria means a passive scan (RSS); specifications and identity
/// resolution must tolerate its absence.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub author: Option<Author>,
    pub works: Vec<Work>,
    /// Explicitly requested DOI, checked before the works' DOI links
    pub doi: Option<String>,
    pub interactive: bool,
    pub user_invoked: bool,
}

/// A user-defined tag-matching rule producing a preference score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFormat {
    pub name: String,
    /// Case-insensitive substrings matched against the release title
    pub terms: Vec<String>,
    pub score: i64,
}

/// A release bound to catalog identity, ready for specification evaluation
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub parsed: ParsedReleaseInfo,
    pub author: Option<Author>,
    pub works: Vec<Work>,
    pub release: ReleaseInfo,
    pub custom_formats: Vec<CustomFormat>,
    pub custom_format_score: i64,
    pub download_allowed: bool,
    pub source: ReleaseSource,
}

impl CandidateMatch {
    /// Candidate carrying only the raw release, used when identity
    /// resolution failed before anything else could be filled in
    pub fn bare(release: ReleaseInfo, parsed: ParsedReleaseInfo) -> Self {
        Self {
            parsed,
            author: None,
            works: Vec::new(),
            release,
            custom_formats: Vec::new(),
            custom_format_score: 0,
            download_allowed: false,
            source: ReleaseSource::Rss,
        }
    }
}

/// Whether a rejection can clear on retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionKind {
    /// Will not pass on a later retry (wrong quality, wrong author)
    Permanent,
    /// May pass later (release delay not yet elapsed)
    Temporary,
}

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub kind: RejectionKind,
    /// Name of the specification that rejected, when one did
    pub specification: Option<String>,
}

impl Rejection {
    pub fn permanent(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kind: RejectionKind::Permanent,
            specification: None,
        }
    }

    pub fn from_spec(spec_name: &str, reason: impl Into<String>, kind: RejectionKind) -> Self {
        Self {
            reason: reason.into(),
            kind,
            specification: Some(spec_name.to_string()),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of evaluating one candidate
///
/// Acceptance is derived: a decision is accepted iff it has no rejections.
#[derive(Debug, Clone)]
pub struct Decision {
    pub candidate: CandidateMatch,
    pub rejections: Vec<Rejection>,
}

impl Decision {
    pub fn accept(candidate: CandidateMatch) -> Self {
        Self {
            candidate,
            rejections: Vec::new(),
        }
    }

    pub fn reject(candidate: CandidateMatch, rejections: Vec<Rejection>) -> Self {
        Self {
            candidate,
            rejections,
        }
    }

    /// Derived acceptance; never stored independently
    pub fn accepted(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Evaluation order group for specifications
///
/// Groups run in ascending order; a rejection in an earlier group prevents
/// later (more expensive) groups from running at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecificationPriority {
    Default,
    /// Rules that consult on-disk file state
    Disk,
}

/// Verdict of a single specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecDecision {
    Accept,
    Reject(String),
}

impl SpecDecision {
    pub fn reject(reason: impl Into<String>) -> Self {
        SpecDecision::Reject(reason.into())
    }
}

/// Specification evaluation fault (distinct from a business rejection)
#[derive(Debug, Error)]
pub enum SpecError {
    /// Required context was malformed beyond the fail-open defaults
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One accept/reject rule in the decision chain
///
/// Specifications are pure: they read the candidate and criteria, touch no
/// I/O, and report faults through `Result` rather than panicking. Missing
/// context (no profile, no parsed quality) defaults to Accept; "Unknown
/// Author" is raised once by the orchestrator, not by every rule.
pub trait Specification: Send + Sync {
    /// Rule name used in synthetic rejections and logging
    fn name(&self) -> &'static str;

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
    }

    fn rejection_kind(&self) -> RejectionKind {
        RejectionKind::Permanent
    }

    fn evaluate(
        &self,
        candidate: &CandidateMatch,
        criteria: Option<&SearchCriteria>,
    ) -> Result<SpecDecision, SpecError>;
}
