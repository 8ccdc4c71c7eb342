//! Quality/upgrade comparison
//!
//! Decides whether a candidate quality improves on what is already on disk
//! and whether the profile still wants an upgrade at all. Ladder position
//! comes from the profile; ties are broken by revision (when propers are
//! preferred) and then by custom-format score.

use scholarr_common::models::{QualityModel, QualityProfile};
use tracing::debug;

/// Upgrade policy evaluation
#[derive(Debug, Clone, Copy)]
pub struct UpgradeService {
    /// Whether proper/repack revisions count as upgrades at equal quality
    pub prefer_propers_and_repacks: bool,
}

impl UpgradeService {
    pub fn new(prefer_propers_and_repacks: bool) -> Self {
        Self {
            prefer_propers_and_repacks,
        }
    }

    /// True when candidate is the same tier but a newer proper/repack
    pub fn is_revision_upgrade(&self, current: QualityModel, candidate: QualityModel) -> bool {
        self.prefer_propers_and_repacks
            && candidate.quality == current.quality
            && candidate.revision > current.revision
    }

    /// True when the candidate strictly improves on one on-disk file
    ///
    /// Higher ladder position wins outright; equal position requires a
    /// revision upgrade or a strictly greater custom-format score.
    pub fn is_upgradable(
        &self,
        profile: &QualityProfile,
        current: QualityModel,
        current_score: i64,
        candidate: QualityModel,
        candidate_score: i64,
    ) -> bool {
        let current_index = profile.index_of(current.quality);
        let candidate_index = profile.index_of(candidate.quality);

        if candidate_index > current_index {
            return true;
        }
        if candidate_index < current_index {
            debug!(
                current = %current,
                candidate = %candidate,
                "Candidate sits below existing quality, not an upgrade"
            );
            return false;
        }

        if self.is_revision_upgrade(current, candidate) {
            return true;
        }

        candidate_score > current_score
    }

    /// True when an on-disk file still sits below the profile's cutoff
    /// (quality tier or custom-format score), i.e. upgrading is still
    /// worthwhile
    pub fn cutoff_not_met(
        &self,
        profile: &QualityProfile,
        current: QualityModel,
        current_score: i64,
    ) -> bool {
        if profile.index_of(current.quality) < profile.cutoff_index() {
            return true;
        }

        current_score < profile.cutoff_format_score
    }

    /// Profile-level upgrade toggle
    pub fn is_upgrade_allowed(&self, profile: &QualityProfile) -> bool {
        profile.upgrade_allowed
    }
}
