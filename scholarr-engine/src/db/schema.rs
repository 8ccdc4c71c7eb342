//! Catalog table definitions
//!
//! The engine reads the catalog that the library manager maintains. Tables
//! are created on startup if missing so tests can run against an in-memory
//! pool with no external migration step.

use anyhow::Result;
use sqlx::SqlitePool;

/// Create catalog tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            clean_name TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'person',
            disambiguation TEXT,
            aliases TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            quality_profile TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_authors_clean_name ON authors(clean_name)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS works (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            title TEXT NOT NULL,
            clean_title TEXT NOT NULL,
            release_date TEXT,
            isbn TEXT,
            asin TEXT,
            language TEXT,
            publisher TEXT,
            format TEXT,
            links TEXT NOT NULL DEFAULT '[]',
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (author_id) REFERENCES authors(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_works_author ON works(author_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_works_clean_title ON works(clean_title)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_files (
            id TEXT PRIMARY KEY,
            work_id TEXT NOT NULL,
            quality TEXT NOT NULL,
            format_score INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (work_id) REFERENCES works(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_work_files_work ON work_files(work_id)")
        .execute(pool)
        .await?;

    Ok(())
}
