//! Creator entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use streamwatch_core::types::{DbId, Timestamp};

/// A row from the `creators` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Creator {
    pub id: DbId,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub is_demo: bool,
    pub last_active_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a creator.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCreator {
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub is_demo: Option<bool>,
    pub last_active_at: Option<Timestamp>,
}

/// Projection returned by the monitorable-creators query: just the key and
/// the raw handle (normalisation happens in `streamwatch_core::handle`).
#[derive(Debug, Clone, FromRow)]
pub struct MonitorableCreator {
    pub id: DbId,
    pub handle: String,
}
