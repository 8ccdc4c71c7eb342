//! Raw release reports from source adapters
//!
//! A `ReleaseInfo` is one search hit as handed over by an indexer adapter.
//! It is immutable input to the evaluation engine; anything derived from it
//! (parsed title, resolved identity) lives in the engine's own types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transfer protocol of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadProtocol {
    Usenet,
    Torrent,
}

/// Where a decision originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseSource {
    Rss,
    Search,
    InteractiveSearch,
    UserInvokedSearch,
    ReleasePush,
}

/// One raw search hit from a source adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub title: String,
    /// Author name supplied directly by the indexer, when its page format
    /// exposes one
    pub author: Option<String>,
    /// Work title supplied directly by the indexer
    pub work: Option<String>,
    /// DOI as reported by the indexer; not yet normalized
    pub doi: Option<String>,
    pub size: i64,
    pub protocol: DownloadProtocol,
    pub indexer_id: i64,
    pub indexer: String,
    /// Lower values are preferred when ranking otherwise-equal releases
    pub indexer_priority: i64,
    pub publish_date: Option<DateTime<Utc>>,
    pub seeders: Option<u32>,
    pub peers: Option<u32>,
}

impl ReleaseInfo {
    /// Minimal release with only a title, used pervasively in tests
    pub fn with_title(title: &str) -> Self {
        Self {
            title: title.to_string(),
            author: None,
            work: None,
            doi: None,
            size: 0,
            protocol: DownloadProtocol::Usenet,
            indexer_id: 0,
            indexer: String::new(),
            indexer_priority: 25,
            publish_date: None,
            seeders: None,
            peers: None,
        }
    }

    /// Age of the release in whole hours, if the publish date is known
    pub fn age_hours(&self) -> Option<i64> {
        self.publish_date
            .map(|published| (Utc::now() - published).num_hours())
    }

    /// Age of the release in whole days, if the publish date is known
    pub fn age_days(&self) -> Option<i64> {
        self.publish_date
            .map(|published| (Utc::now() - published).num_days())
    }
}
