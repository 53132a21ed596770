//! SQLite-backed application store

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::db::models::{ApplicationPatch, ApplicationRecord, ColumnValue};
use crate::store::{ApplicationStore, InsertOutcome};
use crate::{Error, Result};

/// [`ApplicationStore`] over the `applications` table
///
/// Every call is bounded by `timeout`; a call that exceeds it fails with
/// [`Error::Timeout`].
#[derive(Debug, Clone)]
pub struct SqliteApplicationStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteApplicationStore {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(Error::Timeout(format!(
                    "{} did not complete within {} ms",
                    operation,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl ApplicationStore for SqliteApplicationStore {
    async fn insert_empty(&self, id: u32) -> Result<InsertOutcome> {
        self.bounded("insert_empty", async {
            let result = sqlx::query("INSERT INTO applications (id) VALUES (?)")
                .bind(i64::from(id))
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => Ok(InsertOutcome::Inserted),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Ok(InsertOutcome::Collision)
                }
                Err(e) => Err(Error::Database(e)),
            }
        })
        .await
    }

    async fn find(&self, id: u32) -> Result<Option<ApplicationRecord>> {
        self.bounded("find", async {
            let record = sqlx::query_as::<_, ApplicationRecord>(
                "SELECT * FROM applications WHERE id = ? AND deleted_at IS NULL",
            )
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await?;

            Ok(record)
        })
        .await
    }

    async fn fill_unassigned(&self, id: u32, patch: &ApplicationPatch) -> Result<bool> {
        let mut builder: QueryBuilder<'static, Sqlite> =
            QueryBuilder::new("UPDATE applications SET updated_at = CURRENT_TIMESTAMP");

        for (column, value) in patch.columns() {
            builder.push(", ").push(column).push(" = ");
            match value {
                ColumnValue::Bool(v) => builder.push_bind(v),
                ColumnValue::Integer(v) => builder.push_bind(v),
                ColumnValue::Text(v) => builder.push_bind(v.to_string()),
            };
        }

        builder
            .push(" WHERE id = ")
            .push_bind(i64::from(id))
            .push(" AND full_name IS NULL AND deleted_at IS NULL");

        self.bounded("fill_unassigned", async {
            let result = builder.build().execute(&self.pool).await?;
            Ok(result.rows_affected() == 1)
        })
        .await
    }
}
