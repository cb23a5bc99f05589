//! Scheduler tests against in-memory fakes: failure boundaries, the
//! concurrency bound, and cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use streamwatch_core::probe::{LivenessProber, ProbeError, ProbeStatus};
use streamwatch_core::store::memory::MemoryStore;
use streamwatch_core::store::{Creator, CreatorSource, PresenceStore, StoreError};
use streamwatch_monitor::config::MonitorConfig;
use streamwatch_monitor::scheduler::PresenceMonitor;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

fn creator(id: i64) -> Creator {
    Creator {
        id,
        handle: format!("creator_{id}"),
    }
}

fn config(concurrency: usize, threshold: i32) -> MonitorConfig {
    MonitorConfig {
        poll_interval_secs: 60,
        concurrency,
        offline_miss_threshold: threshold,
        ..MonitorConfig::default()
    }
}

/// Returns a fixed creator list every cycle.
struct StaticSource(Vec<Creator>);

#[async_trait]
impl CreatorSource for StaticSource {
    async fn list_monitorable(&self) -> Result<Vec<Creator>, StoreError> {
        Ok(self.0.clone())
    }
}

/// Always fails, simulating an unreachable creator query.
struct FailingSource;

#[async_trait]
impl CreatorSource for FailingSource {
    async fn list_monitorable(&self) -> Result<Vec<Creator>, StoreError> {
        Err("creator query failed".into())
    }
}

/// Answers from a fixed per-handle script; `None` means the probe errors.
/// Counts every probe issued.
struct ScriptedProber {
    script: HashMap<String, Option<ProbeStatus>>,
    probes: Arc<AtomicUsize>,
}

impl ScriptedProber {
    fn new(entries: &[(&str, Option<ProbeStatus>)]) -> Self {
        Self {
            script: entries
                .iter()
                .map(|(handle, status)| (handle.to_string(), *status))
                .collect(),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn probe_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.probes)
    }
}

#[async_trait]
impl LivenessProber for ScriptedProber {
    async fn probe(&self, handle: &str) -> Result<ProbeStatus, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.script.get(handle) {
            Some(Some(status)) => Ok(*status),
            Some(None) => Err(ProbeError::Transport("connection reset".to_string())),
            None => Ok(ProbeStatus::Unknown),
        }
    }
}

/// Reports Live for everyone while tracking how many probes are in flight
/// at once.
struct GaugeProber {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl GaugeProber {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        (
            Self {
                in_flight: Arc::new(AtomicUsize::new(0)),
                max_in_flight: Arc::clone(&max_in_flight),
            },
            max_in_flight,
        )
    }
}

#[async_trait]
impl LivenessProber for GaugeProber {
    async fn probe(&self, _handle: &str) -> Result<ProbeStatus, ProbeError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ProbeStatus::Live)
    }
}

// ---------------------------------------------------------------------------
// Cycle behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cycle_applies_probe_results_to_all_creators() {
    let store = Arc::new(MemoryStore::new());
    let source = StaticSource(vec![creator(1), creator(2), creator(3)]);
    let prober = ScriptedProber::new(&[
        ("creator_1", Some(ProbeStatus::Live)),
        ("creator_2", Some(ProbeStatus::Offline)),
        ("creator_3", Some(ProbeStatus::Unknown)),
    ]);
    let monitor = PresenceMonitor::new(source, prober, Arc::clone(&store), config(4, 2));

    let summary = monitor.run_cycle().await.unwrap();

    assert_eq!(summary.creators, 3);
    assert_eq!(summary.went_live, 1);
    // Offline and Unknown on untracked creators both change nothing.
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.failures, 0);

    assert!(store.presence(1).await.is_some());
    assert!(store.presence(2).await.is_none());
    assert!(store.presence(3).await.is_none());
}

#[tokio::test]
async fn repeated_cycles_drive_sessions_through_their_lifecycle() {
    let store = Arc::new(MemoryStore::new());
    let source = StaticSource(vec![creator(1)]);

    // Cycle 1: live.
    let monitor = PresenceMonitor::new(
        StaticSource(vec![creator(1)]),
        ScriptedProber::new(&[("creator_1", Some(ProbeStatus::Live))]),
        Arc::clone(&store),
        config(2, 2),
    );
    monitor.run_cycle().await.unwrap();
    assert_eq!(store.open_session_count(1).await, 1);

    // Cycles 2 and 3: offline; threshold 2 closes on the second miss.
    let monitor = PresenceMonitor::new(
        source,
        ScriptedProber::new(&[("creator_1", Some(ProbeStatus::Offline))]),
        Arc::clone(&store),
        config(2, 2),
    );
    let summary = monitor.run_cycle().await.unwrap();
    assert_eq!(summary.misses, 1);
    assert_eq!(store.open_session_count(1).await, 1);

    let summary = monitor.run_cycle().await.unwrap();
    assert_eq!(summary.went_offline, 1);
    assert_eq!(store.open_session_count(1).await, 0);
    assert!(store.presence(1).await.is_none());
}

// ---------------------------------------------------------------------------
// Failure boundaries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn source_failure_aborts_cycle_without_touching_state() {
    let store = Arc::new(MemoryStore::new());
    // Seed a live creator, then fail the source.
    store
        .upsert_live(&creator(1), Utc::now())
        .await
        .unwrap();

    let monitor = PresenceMonitor::new(
        FailingSource,
        ScriptedProber::new(&[("creator_1", Some(ProbeStatus::Offline))]),
        Arc::clone(&store),
        config(4, 2),
    );

    assert!(monitor.run_cycle().await.is_err());

    // Nothing was probed or mutated: no miss accrued, session still open.
    let presence = store.presence(1).await.unwrap();
    assert_eq!(presence.miss_count, 0);
    assert_eq!(store.open_session_count(1).await, 1);
}

#[tokio::test]
async fn probe_failure_is_isolated_to_its_creator() {
    let store = Arc::new(MemoryStore::new());
    let source = StaticSource(vec![creator(1), creator(2), creator(3)]);
    let prober = ScriptedProber::new(&[
        ("creator_1", Some(ProbeStatus::Live)),
        ("creator_2", None), // probe errors -> Unknown
        ("creator_3", Some(ProbeStatus::Live)),
    ]);
    let monitor = PresenceMonitor::new(source, prober, Arc::clone(&store), config(4, 2));

    let summary = monitor.run_cycle().await.unwrap();

    // The cycle completed; the failing probe became a neutral Unknown.
    assert_eq!(summary.went_live, 2);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.failures, 0);
    assert!(store.presence(1).await.is_some());
    assert!(store.presence(2).await.is_none());
    assert!(store.presence(3).await.is_some());
}

// ---------------------------------------------------------------------------
// Concurrency bound
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn never_exceeds_configured_concurrency() {
    let store = Arc::new(MemoryStore::new());
    let source = StaticSource((1..=100).map(creator).collect());
    let (prober, max_in_flight) = GaugeProber::new();
    let monitor = PresenceMonitor::new(source, prober, Arc::clone(&store), config(4, 2));

    let summary = monitor.run_cycle().await.unwrap();

    assert_eq!(summary.creators, 100);
    assert_eq!(summary.went_live + summary.still_live, 100);
    let max = max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 4, "observed {max} concurrent probes, limit is 4");
    assert_eq!(store.presence_count().await, 100);
}

// ---------------------------------------------------------------------------
// Scheduling and cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn run_ticks_on_the_interval_and_honours_cancellation() {
    let store = Arc::new(MemoryStore::new());
    let source = StaticSource(vec![creator(1)]);
    let prober = ScriptedProber::new(&[("creator_1", Some(ProbeStatus::Live))]);
    let probes = prober.probe_counter();
    let monitor = PresenceMonitor::new(source, prober, Arc::clone(&store), config(2, 2));

    let cancel = tokio_util::sync::CancellationToken::new();
    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        monitor.run(task_cancel).await;
    });

    // First tick fires immediately.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(probes.load(Ordering::SeqCst), 1);
    assert_eq!(store.open_session_count(1).await, 1);

    // A full interval later the second cycle has run.
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(probes.load(Ordering::SeqCst), 2);
    // Still exactly one session: repeated live cycles are idempotent.
    assert_eq!(store.sessions(1).await.len(), 1);

    cancel.cancel();
    handle.await.unwrap();
    // No further cycles after cancellation.
    assert_eq!(probes.load(Ordering::SeqCst), 2);
}
