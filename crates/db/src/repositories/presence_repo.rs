//! Repository for the `live_presence` table.

use sqlx::PgPool;
use streamwatch_core::types::{DbId, Timestamp};

use crate::models::presence::LivePresence;

/// Column list for `live_presence` SELECT queries.
const COLUMNS: &str = "\
    creator_id, handle, went_live_at, last_seen_live_at, \
    last_check_at, miss_count, updated_at";

/// Provides query operations for current presence state.
pub struct PresenceRepo;

impl PresenceRepo {
    /// Create or refresh the presence row to the live shape.
    ///
    /// Idempotent: a conflicting row keeps its `went_live_at` and has its
    /// liveness timestamps refreshed and `miss_count` reset to 0.
    pub async fn upsert_live(
        pool: &PgPool,
        creator_id: DbId,
        handle: &str,
        now: Timestamp,
    ) -> Result<LivePresence, sqlx::Error> {
        let query = format!(
            "INSERT INTO live_presence \
                 (creator_id, handle, went_live_at, last_seen_live_at, \
                  last_check_at, miss_count, updated_at) \
             VALUES ($1, $2, $3, $3, $3, 0, $3) \
             ON CONFLICT (creator_id) DO UPDATE SET \
                 handle = EXCLUDED.handle, \
                 last_seen_live_at = EXCLUDED.last_seen_live_at, \
                 last_check_at = EXCLUDED.last_check_at, \
                 miss_count = 0, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LivePresence>(&query)
            .bind(creator_id)
            .bind(handle)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Atomically increment `miss_count` and return the new value.
    ///
    /// Returns `None` when the creator has no presence row -- a creator
    /// cannot accrue misses it was never confirmed live for.
    pub async fn record_miss(
        pool: &PgPool,
        creator_id: DbId,
        now: Timestamp,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE live_presence \
             SET miss_count = miss_count + 1, last_check_at = $2, updated_at = $2 \
             WHERE creator_id = $1 \
             RETURNING miss_count",
        )
        .bind(creator_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(count,)| count))
    }

    /// Delete the presence row. Returns `true` if a row was removed;
    /// deleting an absent row is a no-op.
    pub async fn delete<'e, E>(executor: E, creator_id: DbId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM live_presence WHERE creator_id = $1")
            .bind(creator_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get the presence row for a creator.
    pub async fn get(pool: &PgPool, creator_id: DbId) -> Result<Option<LivePresence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM live_presence WHERE creator_id = $1");
        sqlx::query_as::<_, LivePresence>(&query)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// List all presence rows (currently-live overview), most recent first.
    pub async fn list(pool: &PgPool) -> Result<Vec<LivePresence>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM live_presence ORDER BY last_seen_live_at DESC"
        );
        sqlx::query_as::<_, LivePresence>(&query).fetch_all(pool).await
    }
}
