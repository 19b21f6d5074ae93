//! Selection tracking for the currently inspected alert.
//!
//! Selection is a weak reference: only the alert id is stored, and the alert
//! itself is looked up against the latest reconciled state on every read.
//! An id absent from the current state resolves to none; it is never an
//! error, and a stale `Alert` value is never retained. If an evicted id
//! reappears later the selection resolves again.

use lookout_core::alert::Alert;

use crate::reconcile::ReconciledState;

/// Tracks the id of the currently inspected alert.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: Option<String>,
}

impl SelectionTracker {
    /// Create a tracker with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an alert id unconditionally, whether or not it is currently
    /// present. Selecting an alert that is about to arrive is allowed.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// The tracked id, if any.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Resolve the tracked id against the given state.
    ///
    /// Linear scan: the state is capped at a small constant, so no secondary
    /// index is kept.
    pub fn current<'a>(&self, state: &'a ReconciledState) -> Option<&'a Alert> {
        let id = self.selected.as_deref()?;
        state.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::Reconciler;

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            category: "Gun Detected".to_string(),
            confidence: 0.9,
            detected_at: 1_700_000_000_000,
            clip_reference: "https://clips.example/a.mp4".to_string(),
        }
    }

    #[test]
    fn current_resolves_present_id() {
        let mut r = Reconciler::new(20);
        let state = r.apply_snapshot(vec![alert("a"), alert("b")]);

        let mut sel = SelectionTracker::new();
        sel.select("b");
        assert_eq!(sel.current(&state).unwrap().id, "b");
    }

    #[test]
    fn current_is_none_for_absent_id() {
        let mut r = Reconciler::new(20);
        let state = r.apply_snapshot(vec![alert("a")]);

        let mut sel = SelectionTracker::new();
        sel.select("missing");
        assert!(sel.current(&state).is_none());

        sel.clear();
        assert!(sel.current(&state).is_none());
        assert!(sel.selected_id().is_none());
    }

    #[test]
    fn selection_persists_across_state_replacement() {
        let mut r = Reconciler::new(20);
        let mut sel = SelectionTracker::new();

        let state = r.apply_snapshot(vec![alert("a"), alert("b")]);
        sel.select("a");
        assert!(sel.current(&state).is_some());

        // "a" evicted by a snapshot that omits it
        let state = r.apply_snapshot(vec![alert("b")]);
        assert!(sel.current(&state).is_none());

        // "a" reappears: the same selection resolves again
        let state = r.apply_snapshot(vec![alert("a"), alert("b")]);
        assert_eq!(sel.current(&state).unwrap().id, "a");
    }

    #[test]
    fn select_before_arrival_resolves_once_present() {
        let mut r = Reconciler::new(20);
        let mut sel = SelectionTracker::new();

        sel.select("future");
        assert!(sel.current(&r.state()).is_none());

        let state = r.apply_push(alert("future"));
        assert_eq!(sel.current(&state).unwrap().id, "future");
    }
}
