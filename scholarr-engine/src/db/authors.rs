//! Author catalog operations

use anyhow::Result;
use scholarr_common::clean::clean_author_name;
use scholarr_common::models::{Author, AuthorKind};
use sqlx::{Row, SqlitePool};
use strsim::jaro_winkler;
use uuid::Uuid;

/// Save an author (insert or update by id)
pub async fn save_author(pool: &SqlitePool, author: &Author) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO authors (
            id, name, clean_name, kind, disambiguation, aliases, tags, quality_profile
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            clean_name = excluded.clean_name,
            kind = excluded.kind,
            disambiguation = excluded.disambiguation,
            aliases = excluded.aliases,
            tags = excluded.tags,
            quality_profile = excluded.quality_profile,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(author.id.to_string())
    .bind(&author.name)
    .bind(&author.clean_name)
    .bind(kind_to_str(author.kind))
    .bind(&author.disambiguation)
    .bind(serde_json::to_string(&author.aliases)?)
    .bind(serde_json::to_string(&author.tags)?)
    .bind(serde_json::to_string(&author.quality_profile)?)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load an author by id
pub async fn load_author(pool: &SqlitePool, id: Uuid) -> Result<Option<Author>> {
    let row = sqlx::query(&format!("{SELECT_AUTHOR} WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(author_from_row).transpose()
}

/// Exact lookup by the canonical clean form of a name
pub async fn find_author_by_clean_name(
    pool: &SqlitePool,
    clean_name: &str,
) -> Result<Option<Author>> {
    let row = sqlx::query(&format!("{SELECT_AUTHOR} WHERE clean_name = ?"))
        .bind(clean_name)
        .fetch_optional(pool)
        .await?;

    row.map(author_from_row).transpose()
}

/// Fuzzy lookup: the single best author whose clean name (or alias) scores
/// at or above the threshold
pub async fn find_author_by_name_inexact(
    pool: &SqlitePool,
    name: &str,
    threshold: f64,
) -> Result<Option<Author>> {
    let target = clean_author_name(name);
    if target.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(f64, Author)> = None;
    for author in all_authors(pool).await? {
        let mut score = jaro_winkler(&target, &author.clean_name);
        for alias in &author.aliases {
            score = score.max(jaro_winkler(&target, &clean_author_name(alias)));
        }

        if score >= threshold && best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, author));
        }
    }

    Ok(best.map(|(_, author)| author))
}

/// Authors whose clean name occurs inside the cleaned text, used to seed
/// fuzzy parsing of otherwise unparseable titles
pub async fn fuzzy_author_candidates(pool: &SqlitePool, text: &str) -> Result<Vec<Author>> {
    let haystack = clean_author_name(text);
    if haystack.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = all_authors(pool)
        .await?
        .into_iter()
        .filter(|author| {
            !author.clean_name.is_empty() && haystack.contains(author.clean_name.as_str())
        })
        .collect();

    Ok(candidates)
}

/// Load the whole author table
pub async fn all_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let rows = sqlx::query(SELECT_AUTHOR).fetch_all(pool).await?;
    rows.into_iter().map(author_from_row).collect()
}

const SELECT_AUTHOR: &str = r#"
    SELECT id, name, clean_name, kind, disambiguation, aliases, tags, quality_profile
    FROM authors
"#;

fn kind_to_str(kind: AuthorKind) -> &'static str {
    match kind {
        AuthorKind::Person => "person",
        AuthorKind::Journal => "journal",
    }
}

fn author_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Author> {
    let id: String = row.get("id");
    let kind: String = row.get("kind");
    let aliases: String = row.get("aliases");
    let tags: String = row.get("tags");
    let profile: String = row.get("quality_profile");

    Ok(Author {
        id: Uuid::parse_str(&id)?,
        name: row.get("name"),
        clean_name: row.get("clean_name"),
        kind: if kind == "journal" {
            AuthorKind::Journal
        } else {
            AuthorKind::Person
        },
        disambiguation: row.get("disambiguation"),
        aliases: serde_json::from_str(&aliases)?,
        tags: serde_json::from_str(&tags)?,
        quality_profile: serde_json::from_str(&profile)?,
    })
}
