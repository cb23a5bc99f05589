//! HTTP implementation of the liveness prober.
//!
//! Probes an unofficial endpoint, so the classification is deliberately
//! conservative: only an unambiguous 200 or 404 yields a definitive
//! answer. Everything else -- timeouts, transport errors, throttling
//! (429), server errors -- surfaces as an error the scheduler treats as
//! `Unknown`. No built-in retry; a failed probe is simply retried on the
//! next cycle.

use std::time::Duration;

use streamwatch_core::probe::{LivenessProber, ProbeError, ProbeStatus};

use crate::config::MonitorConfig;

/// Probes liveness via HTTP GET on a templated URL.
#[derive(Debug)]
pub struct HttpProber {
    client: reqwest::Client,
    url_template: String,
    live_marker: String,
}

impl HttpProber {
    /// Build a prober from the monitor configuration.
    ///
    /// Fails on an invalid URL template or an unbuildable HTTP client;
    /// both are fatal startup conditions.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, ProbeError> {
        if !config.probe_url_template.contains("{handle}") {
            return Err(ProbeError::Configuration(
                "probe URL template is missing the {handle} placeholder".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()
            .map_err(|e| ProbeError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            url_template: config.probe_url_template.clone(),
            live_marker: config.probe_live_marker.clone(),
        })
    }

    fn render_url(&self, handle: &str) -> String {
        self.url_template.replace("{handle}", handle)
    }

    /// Classify a definitive HTTP response.
    ///
    /// - 404: the handle has no live page -> Offline.
    /// - 200: Live iff the body carries the live marker, else Offline.
    /// - anything else: not a definitive answer.
    fn classify(&self, status: u16, body: &str) -> Result<ProbeStatus, ProbeError> {
        match status {
            404 => Ok(ProbeStatus::Offline),
            200 => {
                if body.contains(&self.live_marker) {
                    Ok(ProbeStatus::Live)
                } else {
                    Ok(ProbeStatus::Offline)
                }
            }
            other => Err(ProbeError::UnexpectedStatus(other)),
        }
    }
}

#[async_trait::async_trait]
impl LivenessProber for HttpProber {
    async fn probe(&self, handle: &str) -> Result<ProbeStatus, ProbeError> {
        let url = self.render_url(handle);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return self.classify(status, "");
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        self.classify(status, &body)
    }
}
