//! Author and journal catalog entities
//!
//! A "journal" is a container entity treated as an author whose works are
//! the papers it published. Matching logic demotes byline matching for
//! journals, so the kind must survive round-trips through the catalog.

use crate::models::profile::QualityProfile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of catalog author entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorKind {
    Person,
    Journal,
}

/// Catalog author (person or journal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    /// Case/punctuation-insensitive form of `name` used for exact lookups
    pub clean_name: String,
    pub kind: AuthorKind,
    /// Free-text qualifier ("Journal", affiliation, era)
    pub disambiguation: Option<String>,
    /// Alternate names (initials forms, transliterations)
    pub aliases: Vec<String>,
    /// User tags, consulted by delay-profile lookup
    pub tags: Vec<String>,
    pub quality_profile: QualityProfile,
}

impl Author {
    /// Minimal author with only a name and kind, used pervasively in tests
    pub fn with_name(name: &str, kind: AuthorKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            clean_name: crate::clean::clean_author_name(name),
            kind,
            disambiguation: None,
            aliases: vec![],
            tags: vec![],
            quality_profile: QualityProfile::default_literature(),
        }
    }

    /// True when this entity is a journal/venue rather than a person
    pub fn is_journal(&self) -> bool {
        self.kind == AuthorKind::Journal
            || self
                .disambiguation
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case("journal"))
    }
}
