//! Adapters from the repository layer to the `streamwatch-core` seams.
//!
//! [`PgPresenceStore`] and [`PgCreatorSource`] are the production
//! implementations of the store and source traits; the core test suites
//! substitute the in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;
use streamwatch_core::store::{Creator, CreatorSource, PresenceStore, StoreError};
use streamwatch_core::types::{DbId, Timestamp};
use streamwatch_core::handle;

use crate::repositories::{CreatorRepo, PresenceRepo, SessionRepo};

/// PostgreSQL-backed presence store.
#[derive(Debug, Clone)]
pub struct PgPresenceStore {
    pool: PgPool,
}

impl PgPresenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for PgPresenceStore {
    async fn upsert_live(&self, creator: &Creator, now: Timestamp) -> Result<bool, StoreError> {
        PresenceRepo::upsert_live(&self.pool, creator.id, &creator.handle, now).await?;
        // The partial unique index makes this a no-op when a session is
        // already open, so repeated live probes never duplicate history.
        let opened =
            SessionRepo::open_if_absent(&self.pool, creator.id, &creator.handle, now).await?;
        Ok(opened.is_some())
    }

    async fn record_miss(
        &self,
        creator_id: DbId,
        now: Timestamp,
    ) -> Result<Option<i32>, StoreError> {
        Ok(PresenceRepo::record_miss(&self.pool, creator_id, now).await?)
    }

    async fn close_and_delete(&self, creator_id: DbId, now: Timestamp) -> Result<(), StoreError> {
        // Session close and presence delete commit together so a crash
        // between them cannot leave a closed session with a lingering
        // presence row. Both halves tolerate already-absent targets.
        let mut tx = self.pool.begin().await?;
        SessionRepo::close_open(&mut *tx, creator_id, now).await?;
        PresenceRepo::delete(&mut *tx, creator_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// PostgreSQL-backed creator source.
///
/// Runs the lookback query and normalises handles; creators whose handle
/// normalises to empty are dropped.
#[derive(Debug, Clone)]
pub struct PgCreatorSource {
    pool: PgPool,
    lookback_days: i32,
}

impl PgCreatorSource {
    pub fn new(pool: PgPool, lookback_days: i32) -> Self {
        Self {
            pool,
            lookback_days,
        }
    }
}

#[async_trait]
impl CreatorSource for PgCreatorSource {
    async fn list_monitorable(&self) -> Result<Vec<Creator>, StoreError> {
        let rows = CreatorRepo::list_monitorable(&self.pool, self.lookback_days).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                handle::normalize(&row.handle).map(|handle| Creator { id: row.id, handle })
            })
            .collect())
    }
}
