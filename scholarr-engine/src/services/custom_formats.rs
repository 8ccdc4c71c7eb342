//! Custom-format matching and scoring
//!
//! Custom formats let users tilt ranking with their own rules ("prefer
//! retail", "avoid OCR scans"). The engine only needs the matched formats
//! and their summed score; the matching strategy sits behind a trait so a
//! richer rule engine can replace the term matcher without touching the
//! orchestrator.

use scholarr_common::models::ReleaseInfo;

use crate::types::CustomFormat;

/// Computes which custom formats a release matches
pub trait FormatScorer: Send + Sync {
    fn formats_for(&self, release: &ReleaseInfo) -> Vec<CustomFormat>;

    /// Summed score of a set of matched formats
    fn score(&self, formats: &[CustomFormat]) -> i64 {
        formats.iter().map(|f| f.score).sum()
    }
}

/// Matches a format when any of its terms occurs in the release title,
/// case-insensitively
#[derive(Debug, Clone, Default)]
pub struct TermMatchingScorer {
    formats: Vec<CustomFormat>,
}

impl TermMatchingScorer {
    pub fn new(formats: Vec<CustomFormat>) -> Self {
        Self { formats }
    }
}

impl FormatScorer for TermMatchingScorer {
    fn formats_for(&self, release: &ReleaseInfo) -> Vec<CustomFormat> {
        let title = release.title.to_lowercase();

        self.formats
            .iter()
            .filter(|format| {
                format
                    .terms
                    .iter()
                    .any(|term| !term.is_empty() && title.contains(&term.to_lowercase()))
            })
            .cloned()
            .collect()
    }
}
