//! # lookout-feed
//!
//! The alert-state synchronization core for LOOKOUT.
//!
//! Two untrusted, independently-timed input channels feed one authoritative
//! alert list:
//!
//! - the snapshot endpoint, polled on a fixed interval for the full current
//!   alert set, and
//! - an optional live push channel delivering one alert per message.
//!
//! The [`Reconciler`] merges both into a single ordered, de-duplicated,
//! size-bounded timeline; the [`FeedCoordinator`] owns that state on a
//! single task, applies updates strictly in arrival order, and publishes
//! immutable [`FeedSnapshot`] values over a `watch` channel for the
//! presentation layer. The [`SelectionTracker`] resolves the currently
//! inspected alert against each published state by id, and the
//! [`MediaMonitor`] follows the proxied video stream with no coupling to
//! alert state at all.

pub mod feed;
pub mod media;
pub mod push;
pub mod reconcile;
pub mod select;
pub mod snapshot;

// Re-export main types for convenience
pub use feed::{FeedCoordinator, FeedHandle, FeedSnapshot};
pub use media::{MediaHandle, MediaMonitor, MediaState, MediaStatus};
pub use push::{EventSource, HttpPushSource, PushEvent, PushState};
pub use reconcile::{ReconciledState, Reconciler};
pub use select::SelectionTracker;
pub use snapshot::SnapshotFetcher;
