//! Stream session entity model.

use serde::Serialize;
use sqlx::FromRow;
use streamwatch_core::types::{DbId, Timestamp};

/// A row from the `stream_sessions` table.
///
/// `ended_at = NULL` marks the open session; a partial unique index
/// guarantees at most one open row per creator.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StreamSession {
    pub id: DbId,
    pub creator_id: DbId,
    pub handle: String,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}
