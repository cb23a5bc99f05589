//! Repository for the `creators` table.

use sqlx::PgPool;
use streamwatch_core::types::DbId;

use crate::models::creator::{CreateCreator, Creator, MonitorableCreator};

/// Column list for `creators` SELECT queries.
const COLUMNS: &str = "id, handle, display_name, is_demo, last_active_at, created_at";

/// Provides query operations for creators.
pub struct CreatorRepo;

impl CreatorRepo {
    /// Insert a creator.
    pub async fn insert(pool: &PgPool, creator: &CreateCreator) -> Result<Creator, sqlx::Error> {
        let query = format!(
            "INSERT INTO creators (handle, display_name, is_demo, last_active_at) \
             VALUES ($1, $2, COALESCE($3, false), $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creator>(&query)
            .bind(&creator.handle)
            .bind(&creator.display_name)
            .bind(creator.is_demo)
            .bind(creator.last_active_at)
            .fetch_one(pool)
            .await
    }

    /// Get a creator by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Creator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creators WHERE id = $1");
        sqlx::query_as::<_, Creator>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List creators eligible for liveness monitoring.
    ///
    /// Filters applied in SQL:
    /// - active within the last `lookback_days` days,
    /// - not flagged as demo,
    /// - handle present and non-blank.
    ///
    /// Handles are returned raw; the caller normalises them (leading `@`
    /// stripped, trimmed) and drops any that normalise to empty.
    pub async fn list_monitorable(
        pool: &PgPool,
        lookback_days: i32,
    ) -> Result<Vec<MonitorableCreator>, sqlx::Error> {
        sqlx::query_as::<_, MonitorableCreator>(
            "SELECT id, handle FROM creators \
             WHERE is_demo = false \
               AND handle IS NOT NULL \
               AND btrim(handle) <> '' \
               AND last_active_at >= now() - make_interval(days => $1) \
             ORDER BY id",
        )
        .bind(lookback_days)
        .fetch_all(pool)
        .await
    }
}
