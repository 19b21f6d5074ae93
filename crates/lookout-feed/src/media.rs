//! Liveness monitoring of the proxied media stream.
//!
//! The media proxy relays the detector's live video byte-for-byte; this
//! monitor consumes it as opaque bytes and publishes a rolling byte count
//! and throughput so the presentation layer can show the feed as live or
//! stalled. It runs on its own task with no coupling to alert state in
//! either direction: a failing alert backend never affects it, and its own
//! failures never reach the alert path.

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Connection state of the media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaState {
    /// Connection not yet established
    #[default]
    Connecting,
    /// Bytes flowing
    Live,
    /// Connected but no bytes within the stall window
    Stalled,
    /// Connection lost; will retry
    Down,
}

impl MediaState {
    /// Short label for the status panel.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Stalled => "stalled",
            Self::Down => "down",
        }
    }
}

/// Published monitor reading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaStatus {
    pub state: MediaState,
    /// Total bytes received since the monitor started
    pub bytes_received: u64,
    /// Throughput over the last measurement window, bytes per second
    pub bytes_per_sec: u64,
}

/// Handle to a running media monitor.
pub struct MediaHandle {
    status: watch::Receiver<MediaStatus>,
    task: JoinHandle<()>,
}

impl MediaHandle {
    /// A receiver for published status readings.
    pub fn subscribe(&self) -> watch::Receiver<MediaStatus> {
        self.status.clone()
    }

    /// Stop the monitor.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Retry delay after a lost or refused connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// No bytes for this long marks the stream stalled.
const STALL_WINDOW: Duration = Duration::from_secs(3);

/// Monitors the media proxy endpoint.
pub struct MediaMonitor;

impl MediaMonitor {
    /// Spawn the monitor task for the given stream URL.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(url: impl Into<String>) -> MediaHandle {
        let url = url.into();
        let (tx, rx) = watch::channel(MediaStatus::default());
        let task = tokio::spawn(run(url, tx));
        MediaHandle { status: rx, task }
    }
}

async fn run(url: String, tx: watch::Sender<MediaStatus>) {
    let client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "media monitor could not create HTTP client");
            return;
        }
    };

    let mut total: u64 = 0;
    loop {
        if tx
            .send(MediaStatus {
                state: MediaState::Connecting,
                bytes_received: total,
                bytes_per_sec: 0,
            })
            .is_err()
        {
            return;
        }

        match follow_stream(&client, &url, &tx, &mut total).await {
            Ok(()) => info!(url = %url, "media stream ended"),
            Err(e) => warn!(url = %url, error = %e, "media stream error"),
        }

        if tx
            .send(MediaStatus {
                state: MediaState::Down,
                bytes_received: total,
                bytes_per_sec: 0,
            })
            .is_err()
        {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Consume the stream until it ends or errors, publishing periodic readings.
async fn follow_stream(
    client: &reqwest::Client,
    url: &str,
    tx: &watch::Sender<MediaStatus>,
    total: &mut u64,
) -> Result<(), reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    debug!(url, "media stream connected");

    let mut stream = response.bytes_stream();
    let mut window_start = Instant::now();
    let mut window_bytes: u64 = 0;
    let mut rate: u64 = 0;

    loop {
        let chunk = tokio::select! {
            chunk = stream.next() => chunk,
            _ = tokio::time::sleep(STALL_WINDOW) => {
                let _ = tx.send(MediaStatus {
                    state: MediaState::Stalled,
                    bytes_received: *total,
                    bytes_per_sec: 0,
                });
                continue;
            }
        };

        match chunk {
            Some(Ok(bytes)) => {
                *total += bytes.len() as u64;
                window_bytes += bytes.len() as u64;

                let elapsed = window_start.elapsed();
                if elapsed >= Duration::from_secs(1) {
                    rate = (window_bytes as f64 / elapsed.as_secs_f64()) as u64;
                    window_start = Instant::now();
                    window_bytes = 0;
                }

                let _ = tx.send(MediaStatus {
                    state: MediaState::Live,
                    bytes_received: *total,
                    bytes_per_sec: rate,
                });
            }
            Some(Err(e)) => return Err(e),
            None => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_state_labels() {
        assert_eq!(MediaState::Connecting.label(), "connecting");
        assert_eq!(MediaState::Live.label(), "live");
        assert_eq!(MediaState::Stalled.label(), "stalled");
        assert_eq!(MediaState::Down.label(), "down");
    }

    #[test]
    fn default_status_is_connecting_with_no_bytes() {
        let status = MediaStatus::default();
        assert_eq!(status.state, MediaState::Connecting);
        assert_eq!(status.bytes_received, 0);
    }
}
