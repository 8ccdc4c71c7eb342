//! DOI normalization and extraction
//!
//! A DOI is `10.` + registrant code (4+ digits) + `/` + suffix. Source
//! adapters report them in many shapes (bare, `doi:` prefixed, full
//! resolver URLs, embedded in text, filename-mangled with `_` or `-` in
//! place of `/`). Everything in the engine compares DOIs only after
//! [`normalize`], which is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use scholarr_common::models::ReleaseInfo;
use std::collections::HashSet;

use crate::types::SearchCriteria;

static DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:doi[:\s]*)?(?:https?://(?:dx\.)?doi\.org/)?(?P<doi>10\.\d{4,}/[^\s"'<>\[\]]+)"#)
        .unwrap()
});

// Filename form where the slash was replaced with an underscore or dash
static DOI_FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?P<doi>10\.\d{4,}[_\-][^\s"'<>\[\]]+)"#).unwrap());

// Transition from digits/separators to a run of letters marks where a DOI
// suffix ends and concatenated prose begins
static WORD_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([\d\-_.()]+)[a-z]{3,}").unwrap());

static VALID_DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,}/.+").unwrap());

static FILE_EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(pdf|epub|mobi|azw3|html?|txt)$").unwrap());

/// Normalize a DOI to its canonical lowercase `10.XXXX/suffix` form
///
/// Returns `None` when no valid DOI can be recovered from the input.
pub fn normalize(doi: &str) -> Option<String> {
    if doi.trim().is_empty() {
        return None;
    }

    if let Some(caps) = DOI_RE.captures(doi) {
        if let Some(clean) = clean_candidate(&caps["doi"]) {
            return Some(clean);
        }
    }

    // Prefix-stripping fallback for inputs the extraction regex misses,
    // e.g. registrant codes shorter than four digits. Validation here is
    // the loose shape rule: starts `10.` and contains `/`.
    let mut trimmed = doi.trim().to_lowercase();
    if let Some(idx) = trimmed.find("doi.org/") {
        trimmed = trimmed[idx + "doi.org/".len()..].to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("doi:") {
        trimmed = rest.trim_start().to_string();
    }

    let doi = tidy_candidate(&trimmed);
    (doi.starts_with("10.") && doi.contains('/')).then_some(doi)
}

/// Trim cruft from a captured DOI candidate and validate it
fn clean_candidate(raw: &str) -> Option<String> {
    let doi = tidy_candidate(raw);
    VALID_DOI_RE.is_match(&doi).then_some(doi)
}

/// Lowercase a candidate and trim trailing/concatenated cruft
///
/// Lowercasing happens first so every index computed below refers to the
/// string it is applied to.
fn tidy_candidate(raw: &str) -> String {
    let mut doi = raw
        .trim()
        .to_lowercase()
        .trim_end_matches(['.', ',', ';', ':', ')', ']'])
        .to_string();

    // Indexers sometimes concatenate the DOI straight onto a landing URL
    if let Some(idx) = doi.find("http") {
        if idx > 0 {
            doi.truncate(idx);
        }
    }

    // Truncate prose glued onto the suffix ("736048casereport" -> "736048")
    if let Some(slash) = doi.find('/') {
        if slash + 1 < doi.len() {
            let suffix = doi[slash + 1..].to_string();
            if let Some(caps) = WORD_BOUNDARY_RE.captures(&suffix) {
                let valid = caps.get(1).map(|m| m.as_str().to_string());
                if let Some(valid) = valid {
                    doi.truncate(slash + 1);
                    doi.push_str(&valid);
                }
            } else if suffix.chars().count() > 100 {
                let clipped: String = suffix.chars().take(100).collect();
                doi.truncate(slash + 1);
                doi.push_str(&clipped);
            }
        }
    }

    doi
}

/// Whether a release's reported DOI matches any DOI the search is after
pub fn is_match(release: &ReleaseInfo, criteria: &SearchCriteria) -> bool {
    let Some(release_doi) = release.doi.as_deref().and_then(normalize) else {
        return false;
    };

    dois_for_criteria(criteria).contains(&release_doi)
}

/// All normalized DOIs a search is targeting
///
/// The explicitly requested DOI comes first, followed by the DOI links of
/// the criteria's works.
pub fn dois_for_criteria(criteria: &SearchCriteria) -> Vec<String> {
    let mut dois = Vec::new();

    if let Some(doi) = criteria.doi.as_deref().and_then(normalize) {
        dois.push(doi);
    }

    for work in &criteria.works {
        if let Some(doi) = work.doi_link().and_then(normalize) {
            if !dois.contains(&doi) {
                dois.push(doi);
            }
        }
    }

    dois
}

/// Extract the first DOI found in free text (PDF body, metadata fields)
pub fn extract_from_text(text: &str) -> Option<String> {
    let caps = DOI_RE.captures(text)?;
    clean_candidate(&caps["doi"])
}

/// Extract a DOI from a filename, restoring `/` from `_` or `-`
pub fn extract_from_filename(filename: &str) -> Option<String> {
    let stem = FILE_EXTENSION_RE.replace(filename, "");

    if let Some(caps) = DOI_RE.captures(&stem) {
        return clean_candidate(&caps["doi"]);
    }

    let caps = DOI_FILENAME_RE.captures(&stem)?;
    let mangled = &caps["doi"];

    // First separator after the registrant code stands in for the slash
    let sep = mangled.find(['_', '-'])?;
    let restored = format!("{}/{}", &mangled[..sep], &mangled[sep + 1..]);
    clean_candidate(&restored)
}

/// Extract every distinct DOI found in free text, in order of appearance
pub fn extract_all_from_text(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dois = Vec::new();

    for caps in DOI_RE.captures_iter(text) {
        if let Some(doi) = clean_candidate(&caps["doi"]) {
            if seen.insert(doi.clone()) {
                dois.push(doi);
            }
        }
    }

    dois
}
