//! Poll scheduler.
//!
//! One long-lived task fires a poll cycle on a fixed interval. A cycle
//! fetches the monitorable creators, shuffles them, and fans them out to
//! a bounded set of concurrent workers; each worker probes liveness and
//! feeds the result through the presence state machine.
//!
//! Failure boundaries:
//! - creator query fails -> the whole cycle is aborted, nothing is
//!   touched, the next tick retries;
//! - a single probe or store operation fails -> that creator alone is
//!   skipped for the cycle (probe failures count as `Unknown`).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use streamwatch_core::presence::{self, PresenceChange};
use streamwatch_core::probe::{LivenessProber, ProbeStatus};
use streamwatch_core::store::{Creator, CreatorSource, PresenceStore, StoreError};

use crate::config::MonitorConfig;

/// Aggregate counts for one completed poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub creators: u32,
    pub went_live: u32,
    pub still_live: u32,
    pub misses: u32,
    pub went_offline: u32,
    pub unchanged: u32,
    /// Creators skipped because their store update failed.
    pub failures: u32,
}

/// Shared counters updated by the workers of one cycle.
#[derive(Debug, Default)]
struct CycleStats {
    went_live: AtomicU32,
    still_live: AtomicU32,
    misses: AtomicU32,
    went_offline: AtomicU32,
    unchanged: AtomicU32,
    failures: AtomicU32,
}

impl CycleStats {
    fn record(&self, change: PresenceChange) {
        let counter = match change {
            PresenceChange::WentLive => &self.went_live,
            PresenceChange::StillLive => &self.still_live,
            PresenceChange::MissRecorded(_) => &self.misses,
            PresenceChange::WentOffline => &self.went_offline,
            PresenceChange::Unchanged => &self.unchanged,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn summary(&self, creators: u32) -> CycleSummary {
        CycleSummary {
            creators,
            went_live: self.went_live.load(Ordering::Relaxed),
            still_live: self.still_live.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            went_offline: self.went_offline.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Periodic presence monitor over a creator source, a prober, and a store.
pub struct PresenceMonitor<Src, Pr, St> {
    source: Src,
    prober: Pr,
    store: St,
    config: MonitorConfig,
}

impl<Src, Pr, St> PresenceMonitor<Src, Pr, St>
where
    Src: CreatorSource,
    Pr: LivenessProber,
    St: PresenceStore,
{
    pub fn new(source: Src, prober: Pr, store: St, config: MonitorConfig) -> Self {
        Self {
            source,
            prober,
            store,
            config,
        }
    }

    /// Run poll cycles until the cancellation token is triggered.
    ///
    /// Cycles never overlap: the tick arm awaits the full cycle and
    /// overdue ticks are skipped, so a cycle that overruns the interval
    /// simply delays the next one.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            concurrency = self.config.concurrency,
            offline_miss_threshold = self.config.offline_miss_threshold,
            "Presence monitor started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Presence monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    match self.run_cycle().await {
                        Ok(summary) => {
                            tracing::info!(
                                creators = summary.creators,
                                went_live = summary.went_live,
                                still_live = summary.still_live,
                                misses = summary.misses,
                                went_offline = summary.went_offline,
                                failures = summary.failures,
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "Poll cycle complete",
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Poll cycle aborted; retrying next tick");
                        }
                    }
                }
            }
        }
    }

    /// Execute a single poll cycle.
    ///
    /// Fails only if the creator source fails; per-creator failures are
    /// absorbed and counted in the summary.
    pub async fn run_cycle(&self) -> Result<CycleSummary, StoreError> {
        let mut creators = self.source.list_monitorable().await?;

        // Fresh random order every cycle: with more creators than workers
        // a fixed order would always probe the same tail-end creators
        // last, starving them whenever a cycle overruns.
        creators.shuffle(&mut rand::rng());

        let total = creators.len() as u32;
        let stats = CycleStats::default();

        futures::stream::iter(creators)
            .for_each_concurrent(self.config.concurrency, |creator| {
                let stats = &stats;
                async move {
                    self.check_creator(creator, stats).await;
                }
            })
            .await;

        Ok(stats.summary(total))
    }

    /// Probe one creator and apply the result to the store.
    async fn check_creator(&self, creator: Creator, stats: &CycleStats) {
        if self.config.probe_jitter_ms > 0 {
            // Spreads probes out so a cycle does not open with a burst of
            // near-simultaneous external calls. Tuning only.
            let wait = rand::rng().random_range(0..self.config.probe_jitter_ms);
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }

        let status = match self.prober.probe(&creator.handle).await {
            Ok(status) => status,
            Err(e) => {
                // Routine given the signal source; a failed probe carries
                // no information about the creator's actual state.
                tracing::debug!(
                    creator_id = creator.id,
                    handle = %creator.handle,
                    error = %e,
                    "Probe failed; treating result as unknown",
                );
                ProbeStatus::Unknown
            }
        };

        let result = presence::apply_probe(
            &self.store,
            &creator,
            status,
            self.config.offline_miss_threshold,
            Utc::now(),
        )
        .await;

        match result {
            Ok(change) => {
                match change {
                    PresenceChange::WentLive => {
                        tracing::info!(
                            creator_id = creator.id,
                            handle = %creator.handle,
                            "Creator went live",
                        );
                    }
                    PresenceChange::WentOffline => {
                        tracing::info!(
                            creator_id = creator.id,
                            handle = %creator.handle,
                            "Creator went offline; session closed",
                        );
                    }
                    PresenceChange::MissRecorded(count) => {
                        tracing::debug!(
                            creator_id = creator.id,
                            miss_count = count,
                            "Offline miss recorded",
                        );
                    }
                    PresenceChange::StillLive | PresenceChange::Unchanged => {}
                }
                stats.record(change);
            }
            Err(e) => {
                tracing::warn!(
                    creator_id = creator.id,
                    handle = %creator.handle,
                    error = %e,
                    "Presence update failed; creator skipped this cycle",
                );
                stats.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
