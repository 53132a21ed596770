//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//! Never modify an existing migration; add a new one and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
///
/// Requires the `schema_version` table to exist.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: Create the applications table
///
/// `id` is the allocated application number; its primary key constraint is
/// what makes random allocation collision-safe.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Create applications table");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id INTEGER PRIMARY KEY NOT NULL CHECK (id >= 0 AND id <= 99999),
            convictions INTEGER,
            best_practice INTEGER,
            certificate_number INTEGER,
            certificate_issued_date TEXT,
            qualification_held TEXT,
            qualification_reference TEXT,
            qualification_obtained_date TEXT,
            red_experience INTEGER,
            red_control INTEGER,
            roe_experience INTEGER,
            roe_control INTEGER,
            sika_experience INTEGER,
            sika_control INTEGER,
            fallow_experience INTEGER,
            fallow_control INTEGER,
            full_name TEXT,
            address_line1 TEXT,
            address_line2 TEXT,
            address_town TEXT,
            address_county TEXT,
            address_postcode TEXT,
            phone_number TEXT,
            email_address TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: Add referee columns to applications
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add referee columns to applications");

    for column in ["referee_name", "referee_email"] {
        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('applications') WHERE name = ?",
        )
        .bind(column)
        .fetch_one(pool)
        .await?;

        if has_column > 0 {
            info!("  {} column already exists - skipping", column);
            continue;
        }

        sqlx::query(&format!("ALTER TABLE applications ADD COLUMN {} TEXT", column))
            .execute(pool)
            .await?;
        info!("  ✓ Added {} column to applications table", column);
    }

    Ok(())
}
