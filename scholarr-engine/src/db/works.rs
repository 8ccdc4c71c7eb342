//! Work catalog operations
//!
//! Works are always loaded with their on-disk files so the specification
//! chain can compare against existing quality without further queries.

use anyhow::Result;
use chrono::NaiveDate;
use scholarr_common::clean::clean_work_title;
use scholarr_common::models::{Work, WorkFile};
use sqlx::{Row, SqlitePool};
use strsim::jaro_winkler;
use uuid::Uuid;

use crate::services::doi;

/// Save a work (insert or update by id); files are saved separately
pub async fn save_work(pool: &SqlitePool, work: &Work) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO works (
            id, author_id, title, clean_title, release_date,
            isbn, asin, language, publisher, format, links
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            author_id = excluded.author_id,
            title = excluded.title,
            clean_title = excluded.clean_title,
            release_date = excluded.release_date,
            isbn = excluded.isbn,
            asin = excluded.asin,
            language = excluded.language,
            publisher = excluded.publisher,
            format = excluded.format,
            links = excluded.links,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(work.id.to_string())
    .bind(work.author_id.to_string())
    .bind(&work.title)
    .bind(&work.clean_title)
    .bind(work.release_date.map(|d| d.to_string()))
    .bind(&work.isbn)
    .bind(&work.asin)
    .bind(&work.language)
    .bind(&work.publisher)
    .bind(&work.format)
    .bind(serde_json::to_string(&work.links)?)
    .execute(pool)
    .await?;

    for file in &work.files {
        save_work_file(pool, file).await?;
    }

    Ok(())
}

/// Save one on-disk file record
pub async fn save_work_file(pool: &SqlitePool, file: &WorkFile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO work_files (id, work_id, quality, format_score)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            quality = excluded.quality,
            format_score = excluded.format_score
        "#,
    )
    .bind(file.id.to_string())
    .bind(file.work_id.to_string())
    .bind(serde_json::to_string(&file.quality)?)
    .bind(file.format_score)
    .execute(pool)
    .await?;

    Ok(())
}

/// All works of an author, files loaded
pub async fn works_for_author(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Work>> {
    let rows = sqlx::query(&format!("{SELECT_WORK} WHERE author_id = ?"))
        .bind(author_id.to_string())
        .fetch_all(pool)
        .await?;

    let mut works = Vec::with_capacity(rows.len());
    for row in rows {
        let mut work = work_from_row(row)?;
        work.files = load_work_files(pool, work.id).await?;
        works.push(work);
    }

    Ok(works)
}

/// Exact lookup by the canonical clean form of a title, scoped to an author
pub async fn find_work_by_clean_title(
    pool: &SqlitePool,
    author_id: Uuid,
    clean_title: &str,
) -> Result<Option<Work>> {
    let row = sqlx::query(&format!(
        "{SELECT_WORK} WHERE author_id = ? AND clean_title = ?"
    ))
    .bind(author_id.to_string())
    .bind(clean_title)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let mut work = work_from_row(row)?;
            work.files = load_work_files(pool, work.id).await?;
            Ok(Some(work))
        }
        None => Ok(None),
    }
}

/// Fuzzy lookup: the single best work of an author scoring at or above the
/// threshold
pub async fn find_work_by_title_inexact(
    pool: &SqlitePool,
    author_id: Uuid,
    title: &str,
    threshold: f64,
) -> Result<Option<Work>> {
    let target = clean_work_title(title);
    if target.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(f64, Work)> = None;
    for work in works_for_author(pool, author_id).await? {
        let score = jaro_winkler(&target, &work.clean_title);
        if score >= threshold && best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, work));
        }
    }

    Ok(best.map(|(_, work)| work))
}

/// Works of an author whose clean title occurs inside the cleaned text,
/// used to seed fuzzy parsing of otherwise unparseable titles
pub async fn fuzzy_work_candidates(
    pool: &SqlitePool,
    author_id: Uuid,
    text: &str,
) -> Result<Vec<Work>> {
    let haystack = clean_work_title(text);
    if haystack.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = works_for_author(pool, author_id)
        .await?
        .into_iter()
        .filter(|work| !work.clean_title.is_empty() && haystack.contains(&work.clean_title))
        .collect();

    Ok(candidates)
}

/// Work whose DOI link matches the given normalized DOI
pub async fn find_work_by_doi(pool: &SqlitePool, normalized_doi: &str) -> Result<Option<Work>> {
    let rows = sqlx::query(&format!("{SELECT_WORK} WHERE links LIKE '%doi%'"))
        .fetch_all(pool)
        .await?;

    for row in rows {
        let work = work_from_row(row)?;
        if work.doi_link().and_then(doi::normalize).as_deref() == Some(normalized_doi) {
            let mut work = work;
            work.files = load_work_files(pool, work.id).await?;
            return Ok(Some(work));
        }
    }

    Ok(None)
}

/// Works of an author released within an inclusive year range; a bound of 0
/// is open
pub async fn works_between_dates(
    pool: &SqlitePool,
    author_id: Uuid,
    start_year: i32,
    end_year: i32,
) -> Result<Vec<Work>> {
    use chrono::Datelike;

    let works = works_for_author(pool, author_id)
        .await?
        .into_iter()
        .filter(|work| {
            let Some(date) = work.release_date else {
                return false;
            };
            let year = date.year();
            (start_year == 0 || year >= start_year) && (end_year == 0 || year <= end_year)
        })
        .collect();

    Ok(works)
}

/// Files already imported for a work
pub async fn load_work_files(pool: &SqlitePool, work_id: Uuid) -> Result<Vec<WorkFile>> {
    let rows = sqlx::query("SELECT id, work_id, quality, format_score FROM work_files WHERE work_id = ?")
        .bind(work_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| {
            let id: String = row.get("id");
            let work_id: String = row.get("work_id");
            let quality: String = row.get("quality");

            Ok(WorkFile {
                id: Uuid::parse_str(&id)?,
                work_id: Uuid::parse_str(&work_id)?,
                quality: serde_json::from_str(&quality)?,
                format_score: row.get("format_score"),
            })
        })
        .collect()
}

const SELECT_WORK: &str = r#"
    SELECT id, author_id, title, clean_title, release_date,
           isbn, asin, language, publisher, format, links
    FROM works
"#;

fn work_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Work> {
    let id: String = row.get("id");
    let author_id: String = row.get("author_id");
    let release_date: Option<String> = row.get("release_date");
    let links: String = row.get("links");

    Ok(Work {
        id: Uuid::parse_str(&id)?,
        author_id: Uuid::parse_str(&author_id)?,
        title: row.get("title"),
        clean_title: row.get("clean_title"),
        release_date: release_date
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()?,
        isbn: row.get("isbn"),
        asin: row.get("asin"),
        language: row.get("language"),
        publisher: row.get("publisher"),
        format: row.get("format"),
        links: serde_json::from_str(&links)?,
        files: Vec::new(),
    })
}
