//! Scholarr release evaluation engine
//!
//! Takes raw release reports from indexer adapters, binds them to catalog
//! identity (author and works), runs them through a chain of accept/reject
//! specifications, and ranks the survivors so the best grab comes first.
//!
//! The public surface is:
//! - [`services::DecisionOrchestrator`]: batch evaluation of releases
//! - [`services::DecisionComparator`]: ordering of accepted decisions
//! - [`types::Specification`]: extension point for custom rules

pub mod db;
pub mod services;
pub mod types;

pub use types::{CandidateMatch, Decision, Rejection, RejectionKind, SearchCriteria, Specification};
