//! Weighted multi-factor match scoring
//!
//! `Distance` accumulates named, weighted penalties and normalizes them to
//! a [0, 1] scalar where lower is better. `work_distance` scores extracted
//! release/file metadata against a catalog work. Accumulation is monotonic:
//! a confirmed mismatch never lowers the total, a confirmed match on a new
//! factor never raises it, and missing optional data is skipped rather than
//! penalized (except for the explicit `*_missing` factors).

use once_cell::sync::Lazy;
use regex::Regex;
use scholarr_common::clean::normalize_title_separators;
use scholarr_common::models::{Author, Work};
use strsim::jaro_winkler;
use tracing::trace;

use crate::services::doi;

/// Relative importance of each scored factor
fn weight(key: &str) -> f64 {
    match key {
        "doi" => 10.0,
        "isbn" | "asin" => 8.0,
        "author" => 3.0,
        "title" => 3.0,
        "source" => 2.0,
        "wrong_format" => 2.0,
        "author_secondary" | "year" | "language" | "publisher" => 1.0,
        "doi_missing" | "isbn_missing" | "asin_missing" => 0.5,
        "ebook_format" | "audio_format" => 0.5,
        _ => 1.0,
    }
}

/// Accumulator of named weighted penalties
#[derive(Debug, Clone, Default)]
pub struct Distance {
    penalties: Vec<(&'static str, f64)>,
}

impl Distance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw penalty in [0, 1] for a factor
    pub fn add(&mut self, key: &'static str, penalty: f64) {
        self.penalties.push((key, penalty.clamp(0.0, 1.0)));
    }

    /// Full penalty when the expression holds, none otherwise
    pub fn add_bool(&mut self, key: &'static str, expr: bool) {
        self.add(key, if expr { 1.0 } else { 0.0 });
    }

    /// Penalty proportional to `value / max`; no-op on a degenerate max
    pub fn add_ratio(&mut self, key: &'static str, value: f64, max: f64) {
        let penalty = if max > 0.0 { value / max } else { 0.0 };
        self.add(key, penalty);
    }

    /// String-similarity penalty between one value and one target
    pub fn add_string(&mut self, key: &'static str, value: &str, target: &str) {
        self.add(key, string_score(value, target));
    }

    /// Best (lowest) string-similarity penalty across all value/target pairs
    pub fn add_string_options<V, T>(&mut self, key: &'static str, values: &[V], targets: &[T])
    where
        V: AsRef<str>,
        T: AsRef<str>,
    {
        let best = values
            .iter()
            .flat_map(|v| targets.iter().map(move |t| string_score(v.as_ref(), t.as_ref())))
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(1.0);
        self.add(key, best);
    }

    /// Weighted, normalized total in [0, 1]; 0 when nothing was scored
    pub fn normalized(&self) -> f64 {
        let max: f64 = self.penalties.iter().map(|(key, _)| weight(key)).sum();
        if max == 0.0 {
            return 0.0;
        }
        let total: f64 = self
            .penalties
            .iter()
            .map(|(key, penalty)| weight(key) * penalty)
            .sum();
        total / max
    }

    /// Raw penalty recorded for a factor, if it was scored
    pub fn penalty(&self, key: &str) -> Option<f64> {
        self.penalties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| *p)
    }
}

/// String distance in [0, 1]; 0 = identical ignoring case/whitespace
pub fn string_score(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    1.0 - jaro_winkler(&a, &b)
}

/// Metadata extracted from a release or local file, one side of a match
#[derive(Debug, Clone, Default)]
pub struct ExtractedMetadata {
    pub authors: Vec<String>,
    pub title: Option<String>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    pub asin: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    /// Journal/venue name from the metadata, when distinct from the byline
    pub source: Option<String>,
    /// True when the file is an audio edition
    pub audio: bool,
}

static TITLE_CRUFT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\(unabridged\)").unwrap());

const EBOOK_FORMATS: &[&str] = &["Kindle Edition", "Nook", "ebook"];
const AUDIOBOOK_FORMATS: &[&str] = &[
    "Audiobook",
    "Audio CD",
    "Audio Cassette",
    "Audible Audio",
    "CD-ROM",
    "MP3 CD",
];

/// Score extracted metadata against a catalog work
///
/// `all_authors` is the full contributor list known for the candidate, used
/// to match each extracted author individually; when absent, matching falls
/// back to comparing against the owning entity's name only.
pub fn work_distance(
    local: &ExtractedMetadata,
    work: &Work,
    author: &Author,
    all_authors: Option<&[Author]>,
) -> Distance {
    let mut dist = Distance::new();

    score_doi(&mut dist, local, work);
    score_authors(&mut dist, local, author, all_authors);
    score_title(&mut dist, local, work);
    score_identifiers(&mut dist, local, work);
    score_year(&mut dist, local, work);
    score_edition(&mut dist, local, work, author);

    trace!(
        work = %work.title,
        distance = dist.normalized(),
        "Scored work candidate"
    );

    dist
}

fn score_doi(dist: &mut Distance, local: &ExtractedMetadata, work: &Work) {
    let local_doi = local.doi.as_deref().and_then(doi::normalize);
    let work_doi = work.doi_link().and_then(doi::normalize);

    match (local_doi, work_doi) {
        (Some(a), Some(b)) => dist.add_bool("doi", a != b),
        (None, None) => {}
        _ => dist.add_bool("doi_missing", true),
    }
}

fn score_authors(
    dist: &mut Distance,
    local: &ExtractedMetadata,
    author: &Author,
    all_authors: Option<&[Author]>,
) {
    let variants = author_variants(&local.authors);
    if variants.is_empty() {
        return;
    }

    let journal = author.is_journal();

    // Best pairing of any extracted author against any known contributor,
    // matching names individually rather than as concatenated strings
    let best_individual = all_authors.map(|contributors| {
        let mut best = 1.0_f64;
        for file_author in &variants {
            for contributor in contributors.iter().filter(|c| !c.is_journal()) {
                best = best.min(string_score(file_author, &contributor.name));
                for alias in &contributor.aliases {
                    best = best.min(string_score(file_author, alias));
                }
            }
        }
        best
    });

    let name_match = variants
        .iter()
        .map(|v| string_score(v, &author.name))
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(1.0);

    if journal {
        // A paper's byline is secondary to the venue identity: take the
        // better of journal-name match and best individual contributor match
        let penalty = best_individual.map_or(name_match, |b| b.min(name_match));
        dist.add("author_secondary", penalty);
    } else {
        let penalty = best_individual
            .filter(|&b| b < name_match)
            .unwrap_or(name_match);
        dist.add("author", penalty);
    }
}

fn score_title(dist: &mut Distance, local: &ExtractedMetadata, work: &Work) {
    let Some(title) = local.title.as_deref() else {
        return;
    };

    let local_variants = title_variants(title);
    let work_variants = title_variants(&work.title);
    dist.add_string_options("title", &local_variants, &work_variants);
}

fn score_identifiers(dist: &mut Distance, local: &ExtractedMetadata, work: &Work) {
    match (local.isbn.as_deref(), work.isbn.as_deref()) {
        (Some(a), Some(b)) => dist.add_bool("isbn", a != b),
        (None, None) => {}
        _ => dist.add_bool("isbn_missing", true),
    }

    match (local.asin.as_deref(), work.asin.as_deref()) {
        (Some(a), Some(b)) => dist.add_bool("asin", a != b),
        (None, None) => {}
        _ => dist.add_bool("asin_missing", true),
    }
}

fn score_year(dist: &mut Distance, local: &ExtractedMetadata, work: &Work) {
    let (Some(local_year), Some(date)) = (local.year, work.release_date) else {
        return;
    };

    use chrono::Datelike;
    let work_year = date.year();
    if local_year == work_year {
        dist.add("year", 0.0);
    } else {
        let diff = (local_year - work_year).abs() as f64;
        // For current-year works the age span is zero; a mismatch must
        // still score as one, never as a perfect match
        let max = ((chrono::Utc::now().year() - work_year).abs() as f64).max(diff);
        dist.add_ratio("year", diff, max);
    }
}

fn score_edition(dist: &mut Distance, local: &ExtractedMetadata, work: &Work, author: &Author) {
    if let (Some(a), Some(b)) = (local.language.as_deref(), work.language.as_deref()) {
        dist.add_bool("language", !a.eq_ignore_ascii_case(b));
    }

    if let (Some(a), Some(b)) = (local.publisher.as_deref(), work.publisher.as_deref()) {
        dist.add_string("publisher", a, b);
    }

    // Journal name comparison: the venue the file claims against the venue
    // the catalog knows
    let work_source = if author.is_journal() {
        Some(author.name.as_str())
    } else {
        author.disambiguation.as_deref()
    };
    if let (Some(a), Some(b)) = (local.source.as_deref(), work_source) {
        dist.add_string("source", a, b);
    }

    // Tilt toward the right class of edition
    if let Some(format) = work.format.as_deref() {
        if local.audio {
            dist.add_bool("audio_format", !AUDIOBOOK_FORMATS.contains(&format));
        } else {
            dist.add_bool("ebook_format", !EBOOK_FORMATS.contains(&format));
            dist.add_bool("wrong_format", AUDIOBOOK_FORMATS.contains(&format));
        }
    }
}

/// Title forms to try on both sides: raw, separator-normalized,
/// cruft-stripped
fn title_variants(title: &str) -> Vec<String> {
    let normalized = normalize_title_separators(title);
    let mut variants = vec![title.to_string()];
    for candidate in [
        normalized.clone(),
        TITLE_CRUFT_RE.replace_all(title, "").trim().to_string(),
        TITLE_CRUFT_RE.replace_all(&normalized, "").trim().to_string(),
    ] {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Expand a byline into the name forms it might have been written in
///
/// A single entry is split on `;`, `/`, " and ", " & "; a "Last, First"
/// entry additionally yields "First Last".
pub fn author_variants(authors: &[String]) -> Vec<String> {
    let mut variants: Vec<String> = authors
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if variants.len() == 1 {
        for part in split_byline(&variants[0]) {
            if !variants.contains(&part) {
                variants.push(part);
            }
        }
    }

    for author in authors {
        if let Some((last, first)) = author.split_once(',') {
            if !last.trim().contains(' ') {
                let flipped = format!("{} {}", first.trim(), last.trim());
                if !variants.contains(&flipped) {
                    variants.push(flipped);
                }
            }
        }
    }

    variants
}

fn split_byline(input: &str) -> Vec<String> {
    for sep in [';', '/'] {
        if input.contains(sep) {
            return input.split(sep).map(|s| s.trim().to_string()).collect();
        }
    }

    for sep in [" and ", " & "] {
        if input.contains(sep) {
            let mut parts = Vec::new();
            for piece in input.split(sep).map(str::trim) {
                let nested = split_byline(piece);
                if nested.is_empty() {
                    parts.push(piece.to_string());
                } else {
                    parts.extend(nested);
                }
            }
            return parts;
        }
    }

    // "Doe, Jane, Smith, John" style lists only split when the first piece
    // looks like a full name already
    if input.contains(',') {
        let parts: Vec<String> = input.split(',').map(|s| s.trim().to_string()).collect();
        if parts[0].contains(' ') {
            return parts;
        }
    }

    Vec::new()
}
