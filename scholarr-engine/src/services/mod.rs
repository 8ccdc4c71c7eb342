//! Evaluation engine services
//!
//! `DecisionOrchestrator` is the entry point; everything else is a
//! collaborator it wires together: title parsing, DOI handling, catalog
//! identity resolution, custom-format scoring, the specification chain,
//! and ranking of the accepted decisions.

pub mod custom_formats;
pub mod decision_comparator;
pub mod decision_orchestrator;
pub mod distance;
pub mod doi;
pub mod identity_resolver;
pub mod specifications;
pub mod title_parser;
pub mod upgradable;

pub use custom_formats::{FormatScorer, TermMatchingScorer};
pub use decision_comparator::DecisionComparator;
pub use decision_orchestrator::DecisionOrchestrator;
pub use distance::{Distance, ExtractedMetadata};
pub use identity_resolver::IdentityResolver;
pub use upgradable::UpgradeService;
