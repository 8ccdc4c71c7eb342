//! Quality and delay profiles
//!
//! A quality profile is an ordered ladder of tiers with per-tier allowed
//! flags, a cutoff tier (stop upgrading once reached), an upgrade toggle,
//! and custom-format score limits. Profiles are stored as JSON columns on
//! the authors table and deserialized with serde.

use crate::models::quality::Quality;
use crate::models::release::DownloadProtocol;
use serde::{Deserialize, Serialize};

/// One rung of the quality ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileItem {
    pub quality: Quality,
    pub allowed: bool,
}

/// Ladder position of a quality within a profile
///
/// `None` index means the quality is not in the profile at all; comparisons
/// treat it as below every known rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QualityIndex(pub Option<usize>);

/// Quality profile attached to an author/journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub name: String,
    /// Ladder, worst to best
    pub items: Vec<ProfileItem>,
    /// Tier at which upgrading stops
    pub cutoff: Quality,
    /// Whether upgrading past an existing file is allowed at all
    pub upgrade_allowed: bool,
    /// Minimum custom-format score for a release to be grabbed
    pub min_format_score: Option<i64>,
    /// Custom-format score at which format upgrades stop
    pub cutoff_format_score: i64,
}

impl QualityProfile {
    /// Default profile: everything allowed, cutoff at the top text tier
    pub fn default_literature() -> Self {
        Self {
            name: "Standard".to_string(),
            items: Quality::ladder()
                .iter()
                .map(|&quality| ProfileItem {
                    quality,
                    allowed: quality != Quality::Unknown,
                })
                .collect(),
            cutoff: Quality::Azw3,
            upgrade_allowed: true,
            min_format_score: None,
            cutoff_format_score: 0,
        }
    }

    /// Ladder index of a quality within this profile
    pub fn index_of(&self, quality: Quality) -> QualityIndex {
        QualityIndex(self.items.iter().position(|item| item.quality == quality))
    }

    /// Whether the profile allows a quality tier at all
    pub fn is_allowed(&self, quality: Quality) -> Option<bool> {
        self.items
            .iter()
            .find(|item| item.quality == quality)
            .map(|item| item.allowed)
    }

    /// Ladder index of the cutoff tier
    pub fn cutoff_index(&self) -> QualityIndex {
        self.index_of(self.cutoff)
    }
}

/// Delay profile: per-tag protocol preference used when ranking decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayProfile {
    /// Author tags this profile applies to; empty = applies to everything
    pub tags: Vec<String>,
    pub preferred_protocol: DownloadProtocol,
    /// Evaluation order; lower runs first
    pub order: i64,
}

impl DelayProfile {
    /// Pick the best delay profile for a set of author tags
    ///
    /// The first profile (by `order`) whose tags intersect wins; a profile
    /// with no tags is the catch-all fallback.
    pub fn best_for_tags<'a>(profiles: &'a [DelayProfile], tags: &[String]) -> Option<&'a DelayProfile> {
        let mut sorted: Vec<&DelayProfile> = profiles.iter().collect();
        sorted.sort_by_key(|p| p.order);

        sorted
            .iter()
            .find(|p| !p.tags.is_empty() && p.tags.iter().any(|t| tags.contains(t)))
            .or_else(|| sorted.iter().find(|p| p.tags.is_empty()))
            .copied()
    }
}
