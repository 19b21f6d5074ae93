//! Alert reconciliation: merging snapshot and push inputs into one bounded,
//! de-duplicated, newest-first alert list.
//!
//! The merge rule combines an eventually-consistent poll source with a
//! best-effort live stream: the snapshot is authoritative for every id it
//! lists, while push-introduced alerts the snapshot has not caught up with
//! yet are preserved ahead of it. Push-origin alerts are retained until
//! cap-evicted, surviving any number of snapshots that omit them; a snapshot
//! that does list the id takes the entry over.
//!
//! Ordering is arrival/merge order, newest first. `detected_at` plays no
//! part in ordering: push events can arrive out of timestamp order and the
//! source ordering is not trustworthy.

use std::collections::HashSet;
use std::sync::Arc;

use lookout_core::alert::Alert;
use tracing::{debug, warn};

/// The reconciler's output: an immutable, ordered alert list (newest first,
/// length bounded by the configured cap). Replaced wholesale on every merge;
/// readers never observe partial mutation.
pub type ReconciledState = Arc<[Alert]>;

/// Maintains the authoritative alert list from the two input channels.
///
/// Owned by a single task; all updates are applied strictly serially.
#[derive(Debug)]
pub struct Reconciler {
    /// Maximum retained alerts
    cap: usize,
    /// Current published state
    state: ReconciledState,
    /// Ids of retained alerts that arrived via push and have not yet been
    /// listed by any snapshot. These survive snapshots that omit them.
    push_ids: HashSet<String>,
}

impl Reconciler {
    /// Create an empty reconciler with the given history cap.
    ///
    /// # Panics
    ///
    /// Panics if `cap` is zero; config validation rejects that before a
    /// reconciler is ever constructed.
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "history cap must be at least 1");
        Self {
            cap,
            state: Arc::from(Vec::new()),
            push_ids: HashSet::new(),
        }
    }

    /// The current state. Cheap to clone; shared with readers as-is.
    pub fn state(&self) -> ReconciledState {
        Arc::clone(&self.state)
    }

    /// Apply a full snapshot from the poll source.
    ///
    /// The snapshot replaces the list, except that push-origin alerts it
    /// does not list are preserved and merged in ahead of it (newest-first).
    /// Where an id appears in both sources the snapshot's version wins and
    /// the entry is thereafter snapshot-origin. Malformed entries are
    /// dropped individually; the rest of the batch proceeds. The result is
    /// truncated to the cap.
    pub fn apply_snapshot(&mut self, list: Vec<Alert>) -> ReconciledState {
        // Validate and de-duplicate the snapshot itself; first occurrence
        // wins since the source lists newest first.
        let mut seen: HashSet<String> = HashSet::new();
        let mut snapshot: Vec<Alert> = Vec::with_capacity(list.len());
        for alert in list {
            if let Err(reason) = alert.validate() {
                warn!(%reason, "dropping malformed snapshot entry");
                continue;
            }
            if seen.insert(alert.id.clone()) {
                snapshot.push(alert);
            }
        }

        // Push-origin alerts the snapshot has not caught up with survive,
        // ahead of the snapshot entries, keeping their relative order.
        let survivors: Vec<Alert> = self
            .state
            .iter()
            .filter(|a| self.push_ids.contains(&a.id) && !seen.contains(&a.id))
            .cloned()
            .collect();

        // Ids the snapshot lists are now snapshot-origin.
        self.push_ids.retain(|id| !seen.contains(id));

        let mut merged = survivors;
        merged.extend(snapshot);
        merged.truncate(self.cap);

        self.replace(merged)
    }

    /// Apply one alert from the push channel.
    ///
    /// Prepended if its id is not already present; a duplicate id is a
    /// silent no-op, not an error. A malformed alert is dropped with no
    /// state change. The oldest entries beyond the cap are evicted.
    pub fn apply_push(&mut self, alert: Alert) -> ReconciledState {
        if let Err(reason) = alert.validate() {
            warn!(%reason, "dropping malformed push alert");
            return self.state();
        }
        if self.state.iter().any(|a| a.id == alert.id) {
            debug!(id = %alert.id, "push alert already present, ignoring");
            return self.state();
        }

        self.push_ids.insert(alert.id.clone());

        let mut merged = Vec::with_capacity(self.state.len() + 1);
        merged.push(alert);
        merged.extend(self.state.iter().cloned());
        merged.truncate(self.cap);

        self.replace(merged)
    }

    /// Install a new state and prune push-origin bookkeeping for evicted
    /// entries.
    fn replace(&mut self, merged: Vec<Alert>) -> ReconciledState {
        let retained: HashSet<&str> = merged.iter().map(|a| a.id.as_str()).collect();
        self.push_ids.retain(|id| retained.contains(id.as_str()));

        debug!(len = merged.len(), "reconciled state replaced");
        self.state = Arc::from(merged);
        self.state()
    }
}
