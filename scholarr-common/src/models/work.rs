//! Work catalog entities
//!
//! A work is one desired item (paper, book, monograph) belonging to an
//! author or journal. Links carry external identifiers; the "doi" link is
//! the strong identifier the matching engine keys on. Edition metadata
//! (ISBN, language, publisher, format) is optional and only consulted when
//! both sides of a comparison provide it.

use crate::clean::clean_work_title;
use crate::models::quality::QualityModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External link attached to a work ("doi", "openlibrary", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// On-disk file already imported for a work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkFile {
    pub id: Uuid,
    pub work_id: Uuid,
    pub quality: QualityModel,
    /// Custom-format score computed at import time
    pub format_score: i64,
}

/// Catalog work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    /// Case/punctuation-insensitive form of `title` used for exact lookups
    pub clean_title: String,
    pub release_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub asin: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    /// Edition format label ("ebook", "Audiobook", ...)
    pub format: Option<String>,
    pub links: Vec<Link>,
    /// Files already on disk, loaded with the work
    pub files: Vec<WorkFile>,
}

impl Work {
    /// Minimal work with only a title, used pervasively in tests
    pub fn with_title(author_id: Uuid, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: title.to_string(),
            clean_title: clean_work_title(title),
            release_date: None,
            isbn: None,
            asin: None,
            language: None,
            publisher: None,
            format: None,
            links: vec![],
            files: vec![],
        }
    }

    /// The work's DOI link URL, if any
    pub fn doi_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case("doi"))
            .map(|l| l.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doi_link_lookup_is_case_insensitive() {
        let mut work = Work::with_title(Uuid::new_v4(), "Test");
        work.links = vec![
            Link {
                name: "openlibrary".to_string(),
                url: "https://example.org".to_string(),
            },
            Link {
                name: "DOI".to_string(),
                url: "10.1234/abc".to_string(),
            },
        ];

        assert_eq!(work.doi_link(), Some("10.1234/abc"));
    }

    #[test]
    fn test_with_title_cleans() {
        let work = Work::with_title(Uuid::new_v4(), "The Dispossessed!");
        assert_eq!(work.clean_title, "thedispossessed");
    }
}
