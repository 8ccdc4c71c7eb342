//! Release title parsing
//!
//! Recovers author, work title, quality and revision from the naming shapes
//! indexers actually use:
//! - scene style: `Author-Title-CD-FLAC-2015-GROUP`
//! - bracket style: `Author - Title [PDF] (2015)`
//! - discography style: `Author - Discography 1990-2000`
//!
//! Parsing is best-effort and side-effect free; the orchestrator decides
//! what to do when it comes back empty.

use once_cell::sync::Lazy;
use regex::Regex;
use scholarr_common::clean::{clean_author_name, clean_work_title, normalize_title_separators};
use scholarr_common::models::{Quality, QualityModel};
use strsim::jaro_winkler;
use tracing::debug;

use crate::types::{ParsedReleaseInfo, SearchCriteria};

static DISCOGRAPHY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<author>.+?)[\s\-]+(?:complete\s+)?(?:discography|collected\s+works|collection)\s*\(?(?:(?P<start>\d{4})\s*-\s*(?P<end>\d{4}))?\)?",
    )
    .unwrap()
});

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<author>.+?)\s+-\s+(?P<title>.+?)\s*\[(?P<tags>[^\]]+)\]").unwrap()
});

static REVISION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:proper|repack)\b|\bv(?P<version>[2-9])\b").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());

/// Parse a quality model (tier + proper/repack revision) out of a title
pub fn parse_quality(title: &str) -> QualityModel {
    let quality = title
        .split(['-', '_', '.', ' ', '[', ']', '(', ')'])
        .find_map(Quality::from_token)
        .unwrap_or(Quality::Unknown);

    let version = match REVISION_RE.captures(title) {
        Some(caps) => caps
            .name("version")
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(2),
        None => 1,
    };

    QualityModel::with_revision(quality, version)
}

/// Best-effort parse of a release title
pub fn parse_title(title: &str) -> Option<ParsedReleaseInfo> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    if let Some(parsed) = parse_discography(title) {
        debug!(title, "Parsed as discography request");
        return Some(parsed);
    }

    if let Some(caps) = BRACKET_RE.captures(title) {
        return Some(ParsedReleaseInfo {
            author_name: Some(caps["author"].trim().to_string()),
            work_title: Some(normalize_title_separators(caps["title"].trim())),
            quality: parse_quality(title),
            ..Default::default()
        });
    }

    parse_scene(title)
}

fn parse_discography(title: &str) -> Option<ParsedReleaseInfo> {
    let caps = DISCOGRAPHY_RE.captures(title)?;

    let year = |name: &str| {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .unwrap_or(0)
    };

    Some(ParsedReleaseInfo {
        author_name: Some(caps["author"].trim().trim_end_matches('-').trim().to_string()),
        work_title: None,
        quality: parse_quality(title),
        discography: true,
        discography_start: year("start"),
        discography_end: year("end"),
        disambiguation: None,
    })
}

/// Scene-style names are dash-delimited with quality/year/group tokens at
/// the tail: `Author-Title-CD-FLAC-2015-GROUP`
fn parse_scene(title: &str) -> Option<ParsedReleaseInfo> {
    let segments: Vec<&str> = title.split('-').map(str::trim).collect();
    if segments.len() < 3 {
        return None;
    }

    // Everything from the first quality or year token onward is metadata
    let metadata_start = segments
        .iter()
        .position(|s| Quality::from_token(s).is_some() || YEAR_RE.is_match(s))?;
    if metadata_start < 2 {
        return None;
    }

    let author = segments[0];
    let work_title = segments[1..metadata_start]
        .iter()
        .filter(|s| !is_media_token(s))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    if author.is_empty() || work_title.is_empty() {
        return None;
    }

    Some(ParsedReleaseInfo {
        author_name: Some(author.to_string()),
        work_title: Some(normalize_title_separators(&work_title)),
        quality: parse_quality(title),
        ..Default::default()
    })
}

/// Source-medium tokens that carry no identity information
fn is_media_token(token: &str) -> bool {
    matches!(
        token.to_ascii_uppercase().as_str(),
        "CD" | "WEB" | "VINYL" | "SCAN" | "RETAIL" | "EBOOK" | "AUDIOBOOK"
    )
}

/// Re-parse a title constrained to the vocabulary of an active search
///
/// Used when free parsing failed: if the target author's name (or an alias)
/// appears in the title, adopt it and look for one of the target works'
/// titles in the remainder.
pub fn parse_with_criteria(
    title: &str,
    criteria: &SearchCriteria,
    author_threshold: f64,
) -> Option<ParsedReleaseInfo> {
    let author = criteria.author.as_ref()?;
    let haystack = clean_work_title(&normalize_title_separators(title));

    let mut names: Vec<String> = vec![clean_author_name(&author.name)];
    names.extend(author.aliases.iter().map(|a| clean_author_name(a)));

    let author_found = names.iter().any(|name| {
        !name.is_empty()
            && (haystack.contains(name.as_str())
                || jaro_winkler(name, &haystack) >= author_threshold)
    });
    if !author_found {
        return None;
    }

    let work_title = criteria
        .works
        .iter()
        .find(|work| {
            let clean = clean_work_title(&work.title);
            !clean.is_empty() && haystack.contains(clean.as_str())
        })
        .map(|work| work.title.clone());

    debug!(title, author = %author.name, "Criteria-constrained parse matched");

    Some(ParsedReleaseInfo {
        author_name: Some(author.name.clone()),
        work_title,
        quality: parse_quality(title),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarr_common::models::{Author, AuthorKind, Work};

    #[test]
    fn test_parse_scene_style() {
        let parsed = parse_title("Coldplay-A Head Full Of Dreams Of-CD-FLAC-2015-PERFECT").unwrap();
        assert_eq!(parsed.author_name.as_deref(), Some("Coldplay"));
        assert_eq!(parsed.work_title.as_deref(), Some("A Head Full Of Dreams Of"));
        assert_eq!(parsed.quality.quality, Quality::Flac);
        assert!(!parsed.discography);
    }

    #[test]
    fn test_parse_bracket_style() {
        let parsed = parse_title("Jane Doe - Deep Learning Methods [PDF] (2015)").unwrap();
        assert_eq!(parsed.author_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.work_title.as_deref(), Some("Deep Learning Methods"));
        assert_eq!(parsed.quality.quality, Quality::Pdf);
    }

    #[test]
    fn test_parse_discography_range() {
        let parsed = parse_title("Terry Pratchett - Discography 1990-2000").unwrap();
        assert!(parsed.discography);
        assert_eq!(parsed.author_name.as_deref(), Some("Terry Pratchett"));
        assert_eq!(parsed.discography_start, 1990);
        assert_eq!(parsed.discography_end, 2000);

        let unbounded = parse_title("Terry Pratchett - Discography").unwrap();
        assert!(unbounded.discography);
        assert_eq!(unbounded.discography_start, 0);
        assert_eq!(unbounded.discography_end, 0);
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert!(parse_title("").is_none());
        assert!(parse_title("abc123").is_none());
        assert!(parse_title("----").is_none());
    }

    #[test]
    fn test_parse_quality_revisions() {
        assert_eq!(
            parse_quality("Author-Title-EPUB-2020-GRP"),
            QualityModel::new(Quality::Epub)
        );
        assert_eq!(
            parse_quality("Author-Title-EPUB-PROPER-2020"),
            QualityModel::with_revision(Quality::Epub, 2)
        );
        assert_eq!(
            parse_quality("Author-Title-PDF-REPACK"),
            QualityModel::with_revision(Quality::Pdf, 2)
        );
        assert_eq!(
            parse_quality("Author-Title-MOBI v3"),
            QualityModel::with_revision(Quality::Mobi, 3)
        );
        assert_eq!(parse_quality("nothing here").quality, Quality::Unknown);
    }

    fn criteria_for(author_name: &str, work_titles: &[&str]) -> SearchCriteria {
        let author = Author::with_name(author_name, AuthorKind::Person);
        let author_id = author.id;
        SearchCriteria {
            author: Some(author),
            works: work_titles
                .iter()
                .map(|&title| Work::with_title(author_id, title))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_with_criteria_finds_known_vocabulary() {
        let criteria = criteria_for("Ursula K. Le Guin", &["The Dispossessed"]);

        let parsed = parse_with_criteria(
            "ursula.k.le.guin.the.dispossessed.epub.retail",
            &criteria,
            0.8,
        )
        .unwrap();
        assert_eq!(parsed.author_name.as_deref(), Some("Ursula K. Le Guin"));
        assert_eq!(parsed.work_title.as_deref(), Some("The Dispossessed"));
        assert_eq!(parsed.quality.quality, Quality::Epub);
    }

    #[test]
    fn test_parse_with_criteria_rejects_unrelated_title() {
        let criteria = criteria_for("Ursula K. Le Guin", &["The Dispossessed"]);
        assert!(parse_with_criteria("completely unrelated noise", &criteria, 0.8).is_none());
    }
}
