//! Storage and creator-source seams.
//!
//! The presence state machine never touches storage directly; it issues
//! mutations through [`PresenceStore`]. Each operation is atomic for a
//! single creator -- no cross-creator transaction exists or is needed.

use crate::types::{DbId, Timestamp};

pub mod memory;

/// A creator eligible for monitoring this cycle, as returned by the
/// creator source. Not persisted by the monitor beyond use as a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub id: DbId,
    /// Normalised lookup handle (no leading `@`, no surrounding whitespace).
    pub handle: String,
}

/// Boxed error for store and source operations.
///
/// The monitor only logs these at the per-creator or per-cycle boundary;
/// no caller matches on the concrete type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// The three atomic presence mutations backing the state machine.
///
/// Contract (per creator, independent across creators):
/// - `upsert_live` is idempotent: repeated calls only refresh timestamps
///   and never open a second session while one is already open.
/// - `record_miss` returns the post-increment miss count, or `None` when
///   no presence row exists (a creator cannot accrue misses it was never
///   confirmed live for).
/// - `close_and_delete` is safe to call when the targets are already
///   absent (no-op, not an error).
#[async_trait::async_trait]
pub trait PresenceStore: Send + Sync {
    /// Create or refresh the presence row to the live shape (miss count
    /// reset to 0) and open a session if none is open.
    ///
    /// Returns `true` if a new session was opened by this call.
    async fn upsert_live(&self, creator: &Creator, now: Timestamp) -> Result<bool, StoreError>;

    /// Atomically increment the miss count and return the new value, or
    /// `None` if the creator has no presence row.
    async fn record_miss(&self, creator_id: DbId, now: Timestamp)
        -> Result<Option<i32>, StoreError>;

    /// Close the open session (set `ended_at = now`) and remove the
    /// presence row.
    async fn close_and_delete(&self, creator_id: DbId, now: Timestamp) -> Result<(), StoreError>;
}

/// Supplies the set of creators eligible for monitoring, fresh each cycle.
#[async_trait::async_trait]
pub trait CreatorSource: Send + Sync {
    async fn list_monitorable(&self) -> Result<Vec<Creator>, StoreError>;
}

// Shared handles satisfy the seams too, so a store can be owned by the
// scheduler while another handle observes it (tests, diagnostics).

#[async_trait::async_trait]
impl<T> PresenceStore for std::sync::Arc<T>
where
    T: PresenceStore + ?Sized,
{
    async fn upsert_live(&self, creator: &Creator, now: Timestamp) -> Result<bool, StoreError> {
        (**self).upsert_live(creator, now).await
    }

    async fn record_miss(
        &self,
        creator_id: DbId,
        now: Timestamp,
    ) -> Result<Option<i32>, StoreError> {
        (**self).record_miss(creator_id, now).await
    }

    async fn close_and_delete(&self, creator_id: DbId, now: Timestamp) -> Result<(), StoreError> {
        (**self).close_and_delete(creator_id, now).await
    }
}

#[async_trait::async_trait]
impl<T> CreatorSource for std::sync::Arc<T>
where
    T: CreatorSource + ?Sized,
{
    async fn list_monitorable(&self) -> Result<Vec<Creator>, StoreError> {
        (**self).list_monitorable().await
    }
}
