//! In-memory [`PresenceStore`] implementation.
//!
//! Reference implementation of the store contract, used by the core and
//! monitor test suites in place of PostgreSQL. Mirrors the relational
//! shape closely enough that the same invariants can be asserted: one
//! presence entry per creator, at most one open session per creator.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::store::{Creator, PresenceStore, StoreError};
use crate::types::{DbId, Timestamp};

/// In-memory counterpart of a `live_presence` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub creator_id: DbId,
    pub handle: String,
    pub went_live_at: Timestamp,
    pub last_seen_live_at: Timestamp,
    pub last_check_at: Timestamp,
    pub miss_count: i32,
    pub updated_at: Timestamp,
}

/// In-memory counterpart of a `stream_sessions` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub id: DbId,
    pub creator_id: DbId,
    pub handle: String,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Default)]
struct Inner {
    presence: HashMap<DbId, PresenceEntry>,
    sessions: Vec<SessionEntry>,
    next_session_id: DbId,
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current presence entry for a creator, if any.
    pub async fn presence(&self, creator_id: DbId) -> Option<PresenceEntry> {
        self.inner.lock().await.presence.get(&creator_id).cloned()
    }

    /// All session rows (open and closed) for a creator, in insertion order.
    pub async fn sessions(&self, creator_id: DbId) -> Vec<SessionEntry> {
        self.inner
            .lock()
            .await
            .sessions
            .iter()
            .filter(|s| s.creator_id == creator_id)
            .cloned()
            .collect()
    }

    /// Number of sessions with `ended_at = None` for a creator.
    pub async fn open_session_count(&self, creator_id: DbId) -> usize {
        self.inner
            .lock()
            .await
            .sessions
            .iter()
            .filter(|s| s.creator_id == creator_id && s.ended_at.is_none())
            .count()
    }

    /// Total number of presence entries across all creators.
    pub async fn presence_count(&self) -> usize {
        self.inner.lock().await.presence.len()
    }
}

#[async_trait::async_trait]
impl PresenceStore for MemoryStore {
    async fn upsert_live(&self, creator: &Creator, now: Timestamp) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;

        match inner.presence.get_mut(&creator.id) {
            Some(entry) => {
                entry.handle = creator.handle.clone();
                entry.last_seen_live_at = now;
                entry.last_check_at = now;
                entry.miss_count = 0;
                entry.updated_at = now;
            }
            None => {
                inner.presence.insert(
                    creator.id,
                    PresenceEntry {
                        creator_id: creator.id,
                        handle: creator.handle.clone(),
                        went_live_at: now,
                        last_seen_live_at: now,
                        last_check_at: now,
                        miss_count: 0,
                        updated_at: now,
                    },
                );
            }
        }

        let has_open = inner
            .sessions
            .iter()
            .any(|s| s.creator_id == creator.id && s.ended_at.is_none());
        if has_open {
            return Ok(false);
        }

        inner.next_session_id += 1;
        let id = inner.next_session_id;
        inner.sessions.push(SessionEntry {
            id,
            creator_id: creator.id,
            handle: creator.handle.clone(),
            started_at: now,
            ended_at: None,
            updated_at: now,
        });
        Ok(true)
    }

    async fn record_miss(
        &self,
        creator_id: DbId,
        now: Timestamp,
    ) -> Result<Option<i32>, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.presence.get_mut(&creator_id).map(|entry| {
            entry.miss_count += 1;
            entry.last_check_at = now;
            entry.updated_at = now;
            entry.miss_count
        }))
    }

    async fn close_and_delete(&self, creator_id: DbId, now: Timestamp) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(open) = inner
            .sessions
            .iter_mut()
            .find(|s| s.creator_id == creator_id && s.ended_at.is_none())
        {
            open.ended_at = Some(now);
            open.updated_at = now;
        }
        inner.presence.remove(&creator_id);
        Ok(())
    }
}
