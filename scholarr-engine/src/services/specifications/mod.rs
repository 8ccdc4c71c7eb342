//! Built-in accept/reject rules for the decision chain
//!
//! Profile rules (quality allowed, cutoff, upgrade policy, format score)
//! plus search-scoped rules (right author, right work). All of them follow
//! the missing-context policy: absent profile/author/quality context means
//! Accept, the orchestrator raises "Unknown Author" exactly once.

mod author_requested;
mod cutoff;
mod format_score;
mod quality_allowed;
mod upgrade_allowed;
mod upgrade_disk;
mod work_requested;

pub use author_requested::AuthorRequestedSpecification;
pub use cutoff::CutoffSpecification;
pub use format_score::FormatScoreSpecification;
pub use quality_allowed::QualityAllowedSpecification;
pub use upgrade_allowed::UpgradeAllowedSpecification;
pub use upgrade_disk::UpgradeDiskSpecification;
pub use work_requested::WorkRequestedSpecification;

use crate::services::upgradable::UpgradeService;
use crate::types::Specification;

/// The full built-in chain in registration order
pub fn built_in(upgrade: UpgradeService) -> Vec<Box<dyn Specification>> {
    vec![
        Box::new(QualityAllowedSpecification),
        Box::new(CutoffSpecification::new(upgrade)),
        Box::new(UpgradeAllowedSpecification),
        Box::new(FormatScoreSpecification),
        Box::new(AuthorRequestedSpecification),
        Box::new(WorkRequestedSpecification),
        Box::new(UpgradeDiskSpecification::new(upgrade)),
    ]
}
