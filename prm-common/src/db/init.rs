//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and creates tables
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open or create the database at `db_path` and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets dashboard reads proceed during migration writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with schema, for tests and throwaway runs
///
/// Limited to one connection: every SQLite memory connection is a separate
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_reviews_table(pool).await?;
    create_properties_table(pool).await?;
    Ok(())
}

pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            listing_id TEXT,
            rating REAL,
            comment TEXT NOT NULL,
            guest_name TEXT NOT NULL,
            date TEXT NOT NULL,
            review_type TEXT NOT NULL
                CHECK (review_type IN ('host-to-guest', 'guest-to-host', 'automatic')),
            channel TEXT NOT NULL
                CHECK (channel IN ('hostaway', 'airbnb', 'booking', 'direct')),
            source TEXT NOT NULL,
            approved INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('published', 'pending', 'rejected')),
            review_category TEXT NOT NULL DEFAULT '[]',
            listing_name TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_reviews_listing ON reviews(listing_id)",
        "CREATE INDEX IF NOT EXISTS idx_reviews_channel ON reviews(channel)",
        "CREATE INDEX IF NOT EXISTS idx_reviews_status ON reviews(status)",
        "CREATE INDEX IF NOT EXISTS idx_reviews_approved ON reviews(approved)",
        "CREATE INDEX IF NOT EXISTS idx_reviews_date ON reviews(date DESC)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

pub async fn create_properties_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            rating REAL CHECK (rating IS NULL OR (rating >= 0 AND rating <= 5)),
            description TEXT NOT NULL DEFAULT '',
            amenities TEXT NOT NULL DEFAULT '[]',
            images TEXT NOT NULL DEFAULT '[]',
            slug TEXT,
            price REAL,
            bedrooms INTEGER,
            bathrooms INTEGER,
            max_guests INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_properties_location ON properties(location)",
        "CREATE INDEX IF NOT EXISTS idx_properties_rating ON properties(rating DESC)",
        "CREATE INDEX IF NOT EXISTS idx_properties_price ON properties(price)",
        "CREATE INDEX IF NOT EXISTS idx_properties_slug ON properties(slug)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["properties".to_string(), "reviews".to_string()]);
    }

    #[tokio::test]
    async fn test_database_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("prm.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());
        pool.close().await;

        // Re-open existing file
        let pool = init_database(&db_path).await.unwrap();
        pool.close().await;
    }
}
