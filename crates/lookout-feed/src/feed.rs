//! The feed coordinator: single-task ownership of the reconciled state.
//!
//! All inputs arrive on one event path and are applied one at a time, in
//! wall-clock arrival order, against the single [`Reconciler`] — never by
//! `detected_at` order, which the sources do not guarantee. After every
//! applied event a fresh [`FeedSnapshot`] is published over a `watch`
//! channel; readers only ever see fully replaced immutable values.
//!
//! Fetches run on an interval timer on their own task, so a fetch in flight
//! suspends only itself: push messages keep flowing while it runs. On
//! shutdown the timer stops and the push stream is dropped; a fetch that
//! completes after shutdown finds the event channel closed and its result is
//! silently discarded, never applied to a torn-down state.

use lookout_core::alert::Alert;
use lookout_core::config::DashboardConfig;
use lookout_core::error::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::push::{EventSource, PushEvent, PushState};
use crate::reconcile::{ReconciledState, Reconciler};
use crate::snapshot::SnapshotFetcher;

/// The rendering-ready value published after every applied update.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// The reconciled alert list, newest first, bounded by the cap
    pub alerts: ReconciledState,
    /// Whether a snapshot fetch is currently in flight
    pub fetch_in_flight: bool,
    /// The last fetch's failure, cleared by the next success. The previous
    /// alert list is always retained across failures.
    pub fetch_error: Option<String>,
    /// Whether any snapshot has been applied yet (drives the initial
    /// "loading" indicator)
    pub loaded: bool,
    /// Push channel connection state
    pub push: PushState,
}

impl FeedSnapshot {
    fn initial(push_enabled: bool) -> Self {
        Self {
            alerts: std::sync::Arc::from(Vec::new()),
            fetch_in_flight: false,
            fetch_error: None,
            loaded: false,
            push: if push_enabled {
                PushState::Connecting
            } else {
                PushState::Disconnected
            },
        }
    }
}

/// Internal event stream: every input serialized through one channel.
enum FeedEvent {
    /// A fetch completed (either way)
    SnapshotDone(Result<Vec<Alert>>),
    /// The push source produced an event
    Push(PushEvent),
    /// The UI asked for an immediate fetch
    Refresh,
}

/// Handle to a running feed coordinator.
pub struct FeedHandle {
    state: watch::Receiver<FeedSnapshot>,
    refresh: mpsc::Sender<()>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// A receiver for published feed snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.clone()
    }

    /// A sender the UI can use to request an immediate fetch. `try_send` on
    /// it is safe from synchronous code.
    pub fn refresh_sender(&self) -> mpsc::Sender<()> {
        self.refresh.clone()
    }

    /// Stop the coordinator: cancels the poll timer, drops the push stream,
    /// and discards any in-flight fetch result.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "feed task ended abnormally");
            }
        }
    }
}

/// Builds and spawns the feed coordinator task.
pub struct FeedCoordinator;

impl FeedCoordinator {
    /// Spawn the coordinator for the given configuration.
    ///
    /// `push_source` carries the optional live channel; `None` disables the
    /// push feature entirely, which is not an error. Must be called from
    /// within a tokio runtime.
    pub fn spawn(
        config: &DashboardConfig,
        push_source: Option<Box<dyn EventSource>>,
    ) -> Result<FeedHandle> {
        let fetcher = SnapshotFetcher::new(config.alerts_url.clone(), config.fetch_timeout())?;
        let reconciler = Reconciler::new(config.history_cap);

        let push_enabled = push_source.is_some();
        let (state_tx, state_rx) = watch::channel(FeedSnapshot::initial(push_enabled));
        let (refresh_tx, refresh_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(64);

        // The push source runs on its own task, forwarding into the single
        // event channel; each message is handled to completion before the
        // next is read.
        if let Some(mut source) = push_source {
            let tx = event_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = source.next_event().await {
                    let closed = matches!(event, PushEvent::Closed { .. });
                    if tx.send(FeedEvent::Push(event)).await.is_err() {
                        return;
                    }
                    if closed {
                        return;
                    }
                }
            });
        }

        let run = Runner {
            fetcher,
            reconciler,
            poll_interval: config.poll_interval(),
            snapshot: FeedSnapshot::initial(push_enabled),
            state_tx,
            event_tx,
        };
        let task = tokio::spawn(run.run(event_rx, refresh_rx, shutdown_rx));

        Ok(FeedHandle {
            state: state_rx,
            refresh: refresh_tx,
            shutdown: shutdown_tx,
            task,
        })
    }
}

struct Runner {
    fetcher: SnapshotFetcher,
    reconciler: Reconciler,
    poll_interval: std::time::Duration,
    snapshot: FeedSnapshot,
    state_tx: watch::Sender<FeedSnapshot>,
    event_tx: mpsc::Sender<FeedEvent>,
}

impl Runner {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<FeedEvent>,
        mut refresh: mpsc::Receiver<()>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(url = self.fetcher.url(), "feed coordinator started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    info!("feed coordinator shutting down");
                    break;
                }

                // First tick fires immediately, giving the initial load.
                _ = ticker.tick() => self.start_fetch(),

                Some(()) = refresh.recv() => self.apply(FeedEvent::Refresh),

                Some(event) = events.recv() => self.apply(event),
            }
        }
        // Dropping the event receiver here disconnects any in-flight fetch
        // task and the push forwarder; their late results go nowhere.
    }

    /// Apply one event against the state. Strictly serial: this is the only
    /// place the reconciler is touched.
    fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::SnapshotDone(Ok(alerts)) => {
                self.snapshot.alerts = self.reconciler.apply_snapshot(alerts);
                self.snapshot.fetch_in_flight = false;
                self.snapshot.fetch_error = None;
                self.snapshot.loaded = true;
            }
            FeedEvent::SnapshotDone(Err(e)) => {
                // Last known good: the alert list is left untouched.
                warn!(error = %e, "snapshot fetch failed, retaining previous state");
                self.snapshot.fetch_in_flight = false;
                self.snapshot.fetch_error = Some(e.to_string());
            }
            FeedEvent::Push(PushEvent::Connected) => {
                info!("push channel live");
                self.snapshot.push = PushState::Connected;
            }
            FeedEvent::Push(PushEvent::Message(alert)) => {
                debug!(id = %alert.id, "applying push alert");
                self.snapshot.alerts = self.reconciler.apply_push(alert);
            }
            FeedEvent::Push(PushEvent::Closed { reason }) => {
                info!(%reason, "push channel closed, continuing in poll-only mode");
                self.snapshot.push = PushState::Disconnected;
            }
            FeedEvent::Refresh => {
                self.start_fetch();
                return;
            }
        }
        self.publish();
    }

    /// Kick off a fetch unless one is already in flight. The fetch runs on
    /// its own task so that push events keep flowing while it is pending;
    /// the result comes back through the serialized event channel.
    fn start_fetch(&mut self) {
        if self.snapshot.fetch_in_flight {
            debug!("fetch already in flight, skipping tick");
            return;
        }
        self.snapshot.fetch_in_flight = true;
        self.publish();

        let fetcher = self.fetcher.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch().await;
            // After teardown the channel is closed; the result is discarded.
            let _ = tx.send(FeedEvent::SnapshotDone(result)).await;
        });
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.snapshot.clone());
    }
}
