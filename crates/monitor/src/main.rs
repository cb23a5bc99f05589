//! `streamwatch-monitor` -- creator live-presence polling daemon.
//!
//! Periodically probes an unofficial liveness endpoint for every
//! monitorable creator and maintains the `live_presence` and
//! `stream_sessions` tables.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default | Description                              |
//! |--------------------------|----------|---------|------------------------------------------|
//! | `DATABASE_URL`           | yes      | --      | PostgreSQL connection string             |
//! | `POLL_INTERVAL_SECS`     | no       | `60`    | Seconds between poll cycles              |
//! | `POLL_CONCURRENCY`       | no       | `4`     | Concurrent probes per cycle              |
//! | `OFFLINE_MISS_THRESHOLD` | no       | `2`     | Consecutive misses before session close  |
//! | `CREATOR_LOOKBACK_DAYS`  | no       | `30`    | Creator activity window                  |
//! | `PROBE_URL_TEMPLATE`     | no       | TikTok  | Probe URL with `{handle}` placeholder    |
//! | `PROBE_LIVE_MARKER`      | no       | --      | Body substring marking a live response   |
//! | `PROBE_TIMEOUT_SECS`     | no       | `10`    | Per-probe HTTP timeout                   |
//! | `PROBE_JITTER_MS`        | no       | `0`     | Max random pre-probe delay               |

use streamwatch_monitor::config::MonitorConfig;
use streamwatch_monitor::prober::HttpProber;
use streamwatch_monitor::scheduler::PresenceMonitor;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamwatch_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = MonitorConfig::from_env();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid monitor configuration");
        std::process::exit(1);
    }

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::error!("DATABASE_URL environment variable is required");
        std::process::exit(1);
    });

    // --- Database ---
    let pool = streamwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    streamwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    streamwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Prober ---
    let prober = match HttpProber::from_config(&config) {
        Ok(prober) => prober,
        Err(e) => {
            tracing::error!(error = %e, "Invalid prober configuration");
            std::process::exit(1);
        }
    };

    // --- Monitor ---
    let source =
        streamwatch_db::store::PgCreatorSource::new(pool.clone(), config.creator_lookback_days);
    let store = streamwatch_db::store::PgPresenceStore::new(pool);
    let monitor = PresenceMonitor::new(source, prober, store, config);

    let cancel = tokio_util::sync::CancellationToken::new();
    let monitor_cancel = cancel.clone();
    let mut monitor_handle = tokio::spawn(async move {
        monitor.run(monitor_cancel).await;
    });

    // --- Shutdown ---
    // The monitor loop only returns when cancelled; it ending on its own
    // means something escaped the per-cycle error boundaries.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            cancel.cancel();
            let _ = monitor_handle.await;
            tracing::info!("Presence monitor stopped");
        }
        result = &mut monitor_handle => {
            match result {
                Ok(()) => tracing::error!("Presence monitor loop exited unexpectedly"),
                Err(e) => tracing::error!(error = %e, "Presence monitor task panicked"),
            }
            std::process::exit(1);
        }
    }
}
