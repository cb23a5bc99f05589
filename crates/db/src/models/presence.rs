//! Live-presence entity model.

use serde::Serialize;
use sqlx::FromRow;
use streamwatch_core::types::{DbId, Timestamp};

/// A row from the `live_presence` table.
///
/// Exists only while the creator is live or inside the offline-miss
/// hysteresis window; `miss_count` is always below the configured
/// threshold (threshold-crossing deletes the row).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct LivePresence {
    pub creator_id: DbId,
    pub handle: String,
    /// Set once when the session opened; preserved across refreshes.
    pub went_live_at: Timestamp,
    /// Refreshed on every confirmed-live probe.
    pub last_seen_live_at: Timestamp,
    /// Refreshed on every probe that yields a definitive result.
    pub last_check_at: Timestamp,
    pub miss_count: i32,
    pub updated_at: Timestamp,
}
