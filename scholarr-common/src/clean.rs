//! Canonical text forms for catalog matching
//!
//! The catalog stores `clean_name` / `clean_title` alongside display names;
//! every writer and every matcher must produce the same form, so the
//! cleaning functions live here rather than in the engine.

/// Case/punctuation-insensitive form of an author or journal name
///
/// Drops a leading "The", folds `&` to "and", keeps ASCII alphanumerics.
pub fn clean_author_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('&', "and");
    let stripped = lowered.strip_prefix("the ").unwrap_or(&lowered);
    stripped
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Case/punctuation-insensitive form of a work title
pub fn clean_work_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Replace dot/underscore word separators with spaces and collapse runs
pub fn normalize_title_separators(title: &str) -> String {
    title
        .replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
