//! The optional live push channel.
//!
//! The push source delivers alerts incrementally, one per message, at most
//! once per event and in no guaranteed order relative to the poll source.
//! The transport is hidden behind the [`EventSource`] seam so the feed
//! coordinator owns only the lifecycle (connect, listen, cancel) and tests
//! can drive the feed with a scripted source.
//!
//! The production transport is a long-lived HTTP response streaming
//! newline-delimited JSON, one alert record per line. A malformed line is
//! logged and skipped; one bad message must not disrupt the live feed.
//! Stream end or transport error closes the channel; reconnecting is not
//! the feed's concern.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use lookout_core::alert::Alert;
use lookout_core::error::{LookoutError, Result};
use tracing::{debug, warn};

/// One event from a push source.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// The channel is established; emitted once, before any message
    Connected,
    /// One incrementally delivered alert
    Message(Alert),
    /// The channel ended; emitted once, last
    Closed { reason: String },
}

/// Connection state of the push channel, for the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushState {
    /// No channel configured, or the channel has ended
    #[default]
    Disconnected,
    /// Channel configured, connection not yet established
    Connecting,
    /// Channel live
    Connected,
}

impl PushState {
    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "off",
            Self::Connecting => "connecting",
            Self::Connected => "live",
        }
    }
}

/// An ordered source of push events.
///
/// Contract: zero or one `Connected`, then any number of `Message`s, then
/// exactly one `Closed`, then `None` forever. Each event is delivered at
/// most once.
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<PushEvent>;
}

/// Re-assembles newline-delimited text from arbitrarily split byte chunks.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Absorb one chunk, returning every line completed by it.
    fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }
}

type ChunkStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

/// Push source over a long-lived HTTP response of newline-delimited JSON.
pub struct HttpPushSource {
    url: String,
    client: reqwest::Client,
    stream: Option<ChunkStream>,
    lines: LineBuffer,
    pending: VecDeque<PushEvent>,
    done: bool,
}

impl HttpPushSource {
    /// Create a source for the given channel address. The connection is
    /// opened lazily on the first [`EventSource::next_event`] call.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        // No overall request timeout: the response body is an open-ended
        // stream. Only the connection attempt itself is bounded.
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                LookoutError::internal(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            url: url.into(),
            client,
            stream: None,
            lines: LineBuffer::default(),
            pending: VecDeque::new(),
            done: false,
        })
    }

    async fn connect(&mut self) -> Result<ChunkStream> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LookoutError::push_connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookoutError::push_connect(format!("HTTP {status}")));
        }

        debug!(url = %self.url, "push channel connected");
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed())
    }

    fn decode_lines(&mut self, chunk: &[u8]) {
        for line in self.lines.push_chunk(chunk) {
            match Alert::from_json_line(&line) {
                Ok(alert) => self.pending.push_back(PushEvent::Message(alert)),
                Err(reason) => warn!(%reason, "skipping malformed push message"),
            }
        }
    }
}

#[async_trait]
impl EventSource for HttpPushSource {
    async fn next_event(&mut self) -> Option<PushEvent> {
        if let Some(ev) = self.pending.pop_front() {
            return Some(ev);
        }
        if self.done {
            return None;
        }

        // Lazy connect on first call
        if self.stream.is_none() {
            match self.connect().await {
                Ok(stream) => {
                    self.stream = Some(stream);
                    return Some(PushEvent::Connected);
                }
                Err(e) => {
                    self.done = true;
                    return Some(PushEvent::Closed {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let Some(mut stream) = self.stream.take() else {
            return None;
        };

        loop {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    self.decode_lines(&chunk);
                    if let Some(ev) = self.pending.pop_front() {
                        self.stream = Some(stream);
                        return Some(ev);
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(PushEvent::Closed {
                        reason: e.to_string(),
                    });
                }
                None => {
                    self.done = true;
                    return Some(PushEvent::Closed {
                        reason: "stream ended".to_string(),
                    });
                }
            }
        }
    }
}
