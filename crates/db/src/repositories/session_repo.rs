//! Repository for the `stream_sessions` table.

use sqlx::PgPool;
use streamwatch_core::types::{DbId, Timestamp};

use crate::models::session::StreamSession;

/// Column list for `stream_sessions` SELECT queries.
const COLUMNS: &str = "id, creator_id, handle, started_at, ended_at, updated_at";

/// Provides query operations for session history.
pub struct SessionRepo;

impl SessionRepo {
    /// Open a session for a creator unless one is already open.
    ///
    /// Relies on the partial unique index on `(creator_id) WHERE ended_at
    /// IS NULL`: the insert is a no-op when an open session exists, which
    /// makes repeated live probes (and process restarts) idempotent.
    /// Returns the new session, or `None` if one was already open.
    pub async fn open_if_absent(
        pool: &PgPool,
        creator_id: DbId,
        handle: &str,
        now: Timestamp,
    ) -> Result<Option<StreamSession>, sqlx::Error> {
        let query = format!(
            "INSERT INTO stream_sessions (creator_id, handle, started_at, updated_at) \
             VALUES ($1, $2, $3, $3) \
             ON CONFLICT (creator_id) WHERE ended_at IS NULL DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StreamSession>(&query)
            .bind(creator_id)
            .bind(handle)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Close the open session for a creator, if any.
    ///
    /// Returns `true` if a session was closed; closing when none is open
    /// is a no-op.
    pub async fn close_open<'e, E>(
        executor: E,
        creator_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE stream_sessions SET ended_at = $2, updated_at = $2 \
             WHERE creator_id = $1 AND ended_at IS NULL",
        )
        .bind(creator_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get the open session for a creator, if any.
    pub async fn get_open(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Option<StreamSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stream_sessions \
             WHERE creator_id = $1 AND ended_at IS NULL"
        );
        sqlx::query_as::<_, StreamSession>(&query)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Session history for a creator, oldest first.
    pub async fn list_for_creator(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Vec<StreamSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stream_sessions \
             WHERE creator_id = $1 ORDER BY started_at, id"
        );
        sqlx::query_as::<_, StreamSession>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }
}
