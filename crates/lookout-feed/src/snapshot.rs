//! Snapshot fetching from the alerts poll endpoint.
//!
//! One fetch per timer tick. The whole operation fails only on transport
//! trouble or an unparseable response body, in which case the caller keeps
//! the previous reconciled state (last known good). Individual malformed
//! entries inside a parseable response are dropped by
//! [`SnapshotEnvelope::into_alerts`] without failing the batch.

use std::time::Duration;

use lookout_core::alert::{Alert, SnapshotEnvelope};
use lookout_core::error::{LookoutError, Result};
use tracing::debug;

/// Fetches the full current alert set from the snapshot endpoint.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl SnapshotFetcher {
    /// Create a fetcher for the given endpoint with a bounded per-request
    /// timeout. The timeout guarantees a stuck fetch resolves as a failure
    /// before blocking the poll schedule indefinitely.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LookoutError::internal(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// The endpoint this fetcher polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one snapshot.
    ///
    /// Returns the validated alert list (malformed entries already dropped),
    /// or a transient error when the request, status, or envelope fails as a
    /// whole.
    pub async fn fetch(&self) -> Result<Vec<Alert>> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookoutError::SnapshotTimeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                LookoutError::snapshot_transport_with_source("request failed", e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookoutError::SnapshotStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LookoutError::SnapshotTimeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                LookoutError::snapshot_transport_with_source("reading response body", e)
            }
        })?;

        let envelope: SnapshotEnvelope =
            serde_json::from_str(&body).map_err(LookoutError::snapshot_parse)?;

        let alerts = envelope.into_alerts();
        debug!(count = alerts.len(), "snapshot fetched");
        Ok(alerts)
    }
}
