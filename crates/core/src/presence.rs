//! Presence state machine.
//!
//! Per-creator states, derived from the presence row:
//! - **NotTracked**: no presence row.
//! - **Live**: presence row with `miss_count = 0`.
//! - **OfflinePending(k)**: presence row with `0 < k < threshold`.
//!
//! Reaching the threshold is not a distinct state: the k-th consecutive
//! confirmed-Offline probe atomically closes the open session and deletes
//! the presence row, collapsing back to NotTracked.
//!
//! An `Unknown` probe is a strict no-op in every state. The liveness
//! signal is unofficial and throttled, so a failed probe carries no
//! information; advancing the miss counter on it would end sessions on
//! transient network failure.

use crate::probe::ProbeStatus;
use crate::store::{Creator, PresenceStore, StoreError};
use crate::types::Timestamp;

/// Outcome of feeding one probe result through the state machine.
///
/// Returned so the scheduler can log transitions; carries no data the
/// store does not already hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    /// First live observation of a new session: presence row created or
    /// refreshed and a fresh session opened.
    WentLive,
    /// Live probe while a session was already open: timestamps refreshed,
    /// miss count reset.
    StillLive,
    /// Confirmed-offline probe below the threshold: miss count is now the
    /// carried value, session stays open.
    MissRecorded(i32),
    /// Miss streak reached the threshold: session closed, presence row
    /// deleted, creator is NotTracked again.
    WentOffline,
    /// Nothing to do: `Unknown` probe, or an Offline probe for a creator
    /// that was never tracked.
    Unchanged,
}

/// Apply one probe result for one creator against the store.
///
/// Total over its input domain -- the only failure mode is a propagated
/// store error, which callers treat as an isolated per-creator failure.
/// `threshold` is the number of consecutive confirmed-Offline probes after
/// which the open session is closed (must be >= 1, validated at startup).
pub async fn apply_probe<S>(
    store: &S,
    creator: &Creator,
    probe: ProbeStatus,
    threshold: i32,
    now: Timestamp,
) -> Result<PresenceChange, StoreError>
where
    S: PresenceStore + ?Sized,
{
    match probe {
        ProbeStatus::Live => {
            let opened = store.upsert_live(creator, now).await?;
            Ok(if opened {
                PresenceChange::WentLive
            } else {
                PresenceChange::StillLive
            })
        }
        ProbeStatus::Offline => match store.record_miss(creator.id, now).await? {
            None => Ok(PresenceChange::Unchanged),
            Some(count) if count >= threshold => {
                store.close_and_delete(creator.id, now).await?;
                Ok(PresenceChange::WentOffline)
            }
            Some(count) => Ok(PresenceChange::MissRecorded(count)),
        },
        ProbeStatus::Unknown => Ok(PresenceChange::Unchanged),
    }
}
