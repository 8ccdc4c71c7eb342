//! Catalog database access
//!
//! Read-mostly lookups over the shared SQLite catalog. All operations take
//! an `&SqlitePool` and return `anyhow::Result`; callers decide whether a
//! failure is fatal for the batch or just for one release.

pub mod authors;
pub mod schema;
pub mod works;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the catalog database and make sure its tables exist
pub async fn init_catalog_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to catalog database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    schema::init_tables(&pool).await?;

    Ok(pool)
}

/// In-memory catalog pool with tables created, for tests
pub async fn init_test_pool() -> Result<SqlitePool> {
    let pool = SqlitePool::connect(":memory:").await?;
    schema::init_tables(&pool).await?;
    Ok(pool)
}
