//! The liveness probe seam.
//!
//! The external liveness signal comes from an unofficial endpoint that is
//! rate-limited and flaky. Anything that is not a definitive answer is
//! [`ProbeStatus::Unknown`]: a failed probe carries no information and must
//! never be read as "offline".

use serde::Serialize;

/// Tri-state result of one liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbeStatus {
    /// The creator is confirmed live.
    Live,
    /// The creator is confirmed not live.
    Offline,
    /// The probe did not produce a definitive answer (network error,
    /// throttling, unparseable response).
    Unknown,
}

/// Errors a prober implementation may surface.
///
/// Callers treat every variant as [`ProbeStatus::Unknown`]; the split only
/// exists for log detail.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe transport failed: {0}")]
    Transport(String),

    #[error("probe returned unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid prober configuration: {0}")]
    Configuration(String),
}

/// A source of liveness signals, keyed by normalised handle.
///
/// Implementations must already map their own internal failures they can
/// classify into `ProbeStatus::Unknown`; remaining `Err` values are mapped
/// to `Unknown` by the caller as well, so an error can never propagate past
/// the per-creator boundary.
#[async_trait::async_trait]
pub trait LivenessProber: Send + Sync {
    async fn probe(&self, handle: &str) -> Result<ProbeStatus, ProbeError>;
}
