//! Monitor configuration, loaded from environment variables.

use streamwatch_core::error::CoreError;

/// Default cycle period in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default worker pool size for one cycle.
const DEFAULT_CONCURRENCY: usize = 4;

/// Default number of consecutive confirmed-offline probes before an open
/// session is closed.
const DEFAULT_OFFLINE_MISS_THRESHOLD: i32 = 2;

/// Default creator-activity lookback window in days.
const DEFAULT_CREATOR_LOOKBACK_DAYS: i32 = 30;

/// Default probe endpoint. `{handle}` is replaced with the normalised
/// creator handle.
const DEFAULT_PROBE_URL_TEMPLATE: &str = "https://www.tiktok.com/@{handle}/live";

/// Default body substring that marks a 200 response as live.
const DEFAULT_PROBE_LIVE_MARKER: &str = "\"isLiveBroadcast\":true";

/// Default per-probe HTTP timeout in seconds.
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Default upper bound for the random pre-probe delay, in milliseconds.
/// Zero disables jitter.
const DEFAULT_PROBE_JITTER_MS: u64 = 0;

/// Runtime configuration for the presence monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
    pub concurrency: usize,
    pub offline_miss_threshold: i32,
    pub creator_lookback_days: i32,
    pub probe_url_template: String,
    pub probe_live_marker: String,
    pub probe_timeout_secs: u64,
    pub probe_jitter_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            offline_miss_threshold: DEFAULT_OFFLINE_MISS_THRESHOLD,
            creator_lookback_days: DEFAULT_CREATOR_LOOKBACK_DAYS,
            probe_url_template: DEFAULT_PROBE_URL_TEMPLATE.to_string(),
            probe_live_marker: DEFAULT_PROBE_LIVE_MARKER.to_string(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            probe_jitter_ms: DEFAULT_PROBE_JITTER_MS,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `POLL_INTERVAL_SECS`     | `60`                    |
    /// | `POLL_CONCURRENCY`       | `4`                     |
    /// | `OFFLINE_MISS_THRESHOLD` | `2`                     |
    /// | `CREATOR_LOOKBACK_DAYS`  | `30`                    |
    /// | `PROBE_URL_TEMPLATE`     | TikTok live page        |
    /// | `PROBE_LIVE_MARKER`      | `"isLiveBroadcast":true`|
    /// | `PROBE_TIMEOUT_SECS`     | `10`                    |
    /// | `PROBE_JITTER_MS`        | `0` (disabled)          |
    ///
    /// Unparseable numeric values are a fatal startup condition.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| defaults.poll_interval_secs.to_string())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let concurrency: usize = std::env::var("POLL_CONCURRENCY")
            .unwrap_or_else(|_| defaults.concurrency.to_string())
            .parse()
            .expect("POLL_CONCURRENCY must be a valid usize");

        let offline_miss_threshold: i32 = std::env::var("OFFLINE_MISS_THRESHOLD")
            .unwrap_or_else(|_| defaults.offline_miss_threshold.to_string())
            .parse()
            .expect("OFFLINE_MISS_THRESHOLD must be a valid i32");

        let creator_lookback_days: i32 = std::env::var("CREATOR_LOOKBACK_DAYS")
            .unwrap_or_else(|_| defaults.creator_lookback_days.to_string())
            .parse()
            .expect("CREATOR_LOOKBACK_DAYS must be a valid i32");

        let probe_url_template = std::env::var("PROBE_URL_TEMPLATE")
            .unwrap_or_else(|_| defaults.probe_url_template.clone());

        let probe_live_marker = std::env::var("PROBE_LIVE_MARKER")
            .unwrap_or_else(|_| defaults.probe_live_marker.clone());

        let probe_timeout_secs: u64 = std::env::var("PROBE_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.probe_timeout_secs.to_string())
            .parse()
            .expect("PROBE_TIMEOUT_SECS must be a valid u64");

        let probe_jitter_ms: u64 = std::env::var("PROBE_JITTER_MS")
            .unwrap_or_else(|_| defaults.probe_jitter_ms.to_string())
            .parse()
            .expect("PROBE_JITTER_MS must be a valid u64");

        Self {
            poll_interval_secs,
            concurrency,
            offline_miss_threshold,
            creator_lookback_days,
            probe_url_template,
            probe_live_marker,
            probe_timeout_secs,
            probe_jitter_ms,
        }
    }

    /// Validate value ranges and cross-cutting constraints.
    ///
    /// The store connection pool must support at least as many outstanding
    /// operations as the worker concurrency, so concurrency is capped at
    /// the pool size.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.poll_interval_secs == 0 {
            return Err(CoreError::Validation(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(CoreError::Validation(
                "POLL_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if self.concurrency > streamwatch_db::MAX_POOL_CONNECTIONS as usize {
            return Err(CoreError::Validation(format!(
                "POLL_CONCURRENCY must not exceed the database pool size ({})",
                streamwatch_db::MAX_POOL_CONNECTIONS
            )));
        }
        if self.offline_miss_threshold < 1 {
            return Err(CoreError::Validation(
                "OFFLINE_MISS_THRESHOLD must be at least 1".to_string(),
            ));
        }
        if self.creator_lookback_days < 1 {
            return Err(CoreError::Validation(
                "CREATOR_LOOKBACK_DAYS must be at least 1".to_string(),
            ));
        }
        if !self.probe_url_template.contains("{handle}") {
            return Err(CoreError::Validation(
                "PROBE_URL_TEMPLATE must contain a {handle} placeholder".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MonitorConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_interval_and_concurrency() {
        let mut config = MonitorConfig::default();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_concurrency_beyond_pool_size() {
        let mut config = MonitorConfig::default();
        config.concurrency = streamwatch_db::MAX_POOL_CONNECTIONS as usize + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_threshold_below_one() {
        let mut config = MonitorConfig::default();
        config.offline_miss_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let mut config = MonitorConfig::default();
        config.probe_url_template = "https://example.com/live".to_string();
        assert!(config.validate().is_err());
    }
}
