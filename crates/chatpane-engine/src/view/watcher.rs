//! Mutation watcher: turns container insertions into scroll requests.

use super::container::MutationRecord;
use tracing::trace;

/// Standing observer on the chat container's child list.
///
/// Any insertion path (user submit, reply swap, future ones) ends up here,
/// so scrolling does not depend on which handler added the content.
#[derive(Debug)]
pub struct MutationWatcher {
    connected: bool,
    batches: u64,
    scrolls: u64,
}

impl MutationWatcher {
    /// Create a connected watcher.
    pub fn new() -> Self {
        Self {
            connected: true,
            batches: 0,
            scrolls: 0,
        }
    }

    /// Check if the watcher still receives batches.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Stop observing. Later batches are ignored.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Batches observed while connected.
    pub fn batches_observed(&self) -> u64 {
        self.batches
    }

    /// Scrolls requested so far.
    pub fn scrolls_requested(&self) -> u64 {
        self.scrolls
    }

    /// Observe one batch. Returns `true` when a scroll should run.
    ///
    /// The first record with an added node decides; the rest of the batch
    /// is not examined, so a batch yields at most one scroll.
    pub fn observe(&mut self, batch: &[MutationRecord]) -> bool {
        if !self.connected || batch.is_empty() {
            return false;
        }
        self.batches += 1;

        if batch.iter().any(MutationRecord::has_added) {
            self.scrolls += 1;
            trace!(records = batch.len(), "mutation batch triggers scroll");
            return true;
        }
        false
    }
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::container::NodeId;

    fn added(id: u64) -> MutationRecord {
        MutationRecord {
            added: vec![NodeId(id)],
            removed: Vec::new(),
        }
    }

    fn removed(id: u64) -> MutationRecord {
        MutationRecord {
            added: Vec::new(),
            removed: vec![NodeId(id)],
        }
    }

    #[test]
    fn test_one_scroll_per_batch() {
        let mut watcher = MutationWatcher::new();
        assert!(watcher.observe(&[added(1), added(2), added(3)]));
        assert_eq!(watcher.scrolls_requested(), 1);
        assert_eq!(watcher.batches_observed(), 1);
    }

    #[test]
    fn test_removal_only_batch_does_not_scroll() {
        let mut watcher = MutationWatcher::new();
        assert!(!watcher.observe(&[removed(1)]));
        assert_eq!(watcher.scrolls_requested(), 0);
        assert_eq!(watcher.batches_observed(), 1);
    }

    #[test]
    fn test_mixed_batch_scrolls() {
        let mut watcher = MutationWatcher::new();
        assert!(watcher.observe(&[removed(1), added(2)]));
    }

    #[test]
    fn test_empty_batch_ignored() {
        let mut watcher = MutationWatcher::new();
        assert!(!watcher.observe(&[]));
        assert_eq!(watcher.batches_observed(), 0);
    }

    #[test]
    fn test_disconnected_ignores_batches() {
        let mut watcher = MutationWatcher::new();
        watcher.disconnect();
        assert!(!watcher.is_connected());
        assert!(!watcher.observe(&[added(1)]));
        assert_eq!(watcher.scrolls_requested(), 0);
    }
}
