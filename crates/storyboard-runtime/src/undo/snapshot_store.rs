#![forbid(unsafe_code)]

//! Bounded past/future snapshot history.
//!
//! [`SnapshotStore`] keeps the snapshots *around* the live value, never the
//! live value itself. The owner holds the current state and hands it in on
//! every transition, so capturing a checkpoint costs one [`Arc`] clone.
//!
//! # Architecture
//!
//! ```text
//! checkpoint(s0), checkpoint(s1), checkpoint(s2); current = s3
//! ┌──────────────────────────────────────────────┐
//! │ Past:    [Arc(s0), Arc(s1), Arc(s2)]         │
//! │ Future:  []                                   │
//! │ Current: s3 (owned by caller)                 │
//! └──────────────────────────────────────────────┘
//!
//! undo(s3) x2
//! ┌──────────────────────────────────────────────┐
//! │ Past:    [Arc(s0)]                           │
//! │ Future:  [Arc(s2), Arc(s3)]  (front = newest) │
//! │ Current: s1                                   │
//! └──────────────────────────────────────────────┘
//!
//! checkpoint(s1); current = s4  (new branch: clears future)
//! ┌──────────────────────────────────────────────┐
//! │ Past:    [Arc(s0), Arc(s1)]                  │
//! │ Future:  []                                   │
//! │ Current: s4                                   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Memory Model
//!
//! Snapshots are `Arc<T>`. With `T` built on persistent collections
//! (`im::Vector`), consecutive snapshots share everything that did not
//! change between them.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Default bound for both the past and the future stacks.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Configuration for the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Maximum number of snapshots retained on each stack.
    /// The oldest snapshot is evicted when this limit is exceeded.
    pub max_depth: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SnapshotConfig {
    /// Create a new configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Bounded undo/redo snapshot stacks.
///
/// # Invariants
///
/// 1. `past.len() <= config.max_depth` and `future.len() <= config.max_depth`
///    after any operation.
/// 2. `future` is cleared on every [`checkpoint`](Self::checkpoint).
/// 3. `past` is ordered oldest → newest; `future` newest-undone → oldest.
pub struct SnapshotStore<T> {
    past: VecDeque<Arc<T>>,
    future: VecDeque<Arc<T>>,
    config: SnapshotConfig,
}

impl<T> fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl<T> SnapshotStore<T> {
    /// Create a new snapshot store with the given configuration.
    #[must_use]
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            config,
        }
    }

    /// Create a new snapshot store with default configuration.
    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(SnapshotConfig::default())
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record `previous` as the newest undo step and start a new branch.
    ///
    /// Returns how many of the oldest snapshots were evicted.
    pub fn checkpoint(&mut self, previous: Arc<T>) -> usize {
        self.future.clear();
        self.past.push_back(previous);
        self.enforce_past_depth()
    }

    /// Step back. `current` moves to the front of the future stack and the
    /// newest past snapshot is returned as the new current value.
    ///
    /// Returns `None`, leaving both stacks untouched, when there is nothing
    /// to undo.
    pub fn undo(&mut self, current: &Arc<T>) -> Option<Arc<T>> {
        let previous = self.past.pop_back()?;
        self.future.push_front(Arc::clone(current));
        self.future.truncate(self.config.max_depth);
        Some(previous)
    }

    /// Step forward. The mirror image of [`undo`](Self::undo).
    pub fn redo(&mut self, current: &Arc<T>) -> Option<Arc<T>> {
        let next = self.future.pop_front()?;
        self.past.push_back(Arc::clone(current));
        self.enforce_past_depth();
        Some(next)
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of snapshots on the past stack.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of snapshots on the future stack.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Total number of snapshots across both stacks.
    #[must_use]
    pub fn total_snapshots(&self) -> usize {
        self.past.len() + self.future.len()
    }

    /// The snapshot [`undo`](Self::undo) would restore.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&Arc<T>> {
        self.past.back()
    }

    /// The snapshot [`redo`](Self::redo) would restore.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&Arc<T>> {
        self.future.front()
    }

    /// Past snapshots, oldest first.
    pub fn past(&self) -> impl DoubleEndedIterator<Item = &Arc<T>> + ExactSizeIterator {
        self.past.iter()
    }

    /// Future snapshots, most recently undone first.
    pub fn future(&self) -> impl DoubleEndedIterator<Item = &Arc<T>> + ExactSizeIterator {
        self.future.iter()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Check if both stacks are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.future.is_empty()
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Clear all snapshots.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn enforce_past_depth(&mut self) -> usize {
        let mut evicted = 0;
        while self.past.len() > self.config.max_depth {
            self.past.pop_front();
            evicted += 1;
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the store the way an owner does: keep `current` outside.
    struct Harness {
        store: SnapshotStore<i32>,
        current: Arc<i32>,
    }

    impl Harness {
        fn new(config: SnapshotConfig) -> Self {
            Self {
                store: SnapshotStore::new(config),
                current: Arc::new(0),
            }
        }

        fn set(&mut self, value: i32) -> usize {
            let previous = std::mem::replace(&mut self.current, Arc::new(value));
            self.store.checkpoint(previous)
        }

        fn undo(&mut self) -> bool {
            match self.store.undo(&self.current) {
                Some(prev) => {
                    self.current = prev;
                    true
                }
                None => false,
            }
        }

        fn redo(&mut self) -> bool {
            match self.store.redo(&self.current) {
                Some(next) => {
                    self.current = next;
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = SnapshotStore::<i32>::with_default_config();
        assert!(store.is_empty());
        assert!(!store.can_undo());
        assert!(!store.can_redo());
        assert_eq!(store.undo_depth(), 0);
        assert_eq!(store.redo_depth(), 0);
        assert_eq!(store.total_snapshots(), 0);
        assert!(store.peek_undo().is_none());
    }

    #[test]
    fn checkpoint_enables_undo() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        assert!(h.store.can_undo());
        assert!(!h.store.can_redo());
        assert_eq!(**h.store.peek_undo().unwrap(), 0);
    }

    #[test]
    fn undo_restores_previous() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);
        h.set(3);

        assert!(h.undo());
        assert_eq!(*h.current, 2);
        assert!(h.store.can_redo());
        assert_eq!(**h.store.peek_redo().unwrap(), 3);
    }

    #[test]
    fn undo_all_returns_to_initial() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);

        assert!(h.undo());
        assert!(h.undo());
        assert!(!h.undo());
        assert_eq!(*h.current, 0);
        assert_eq!(h.store.undo_depth(), 0);
        assert_eq!(h.store.redo_depth(), 2);
    }

    #[test]
    fn redo_restores_undone() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);
        h.undo();

        assert!(h.redo());
        assert_eq!(*h.current, 2);
        assert!(!h.store.can_redo());
        assert!(!h.redo());
    }

    #[test]
    fn future_is_ordered_newest_undone_first() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);
        h.set(3);
        h.undo();
        h.undo();
        let future: Vec<i32> = h.store.future().map(|s| **s).collect();
        assert_eq!(future, [2, 3]);
    }

    #[test]
    fn checkpoint_clears_future() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);
        h.undo();
        assert!(h.store.can_redo());

        h.set(9);
        assert!(!h.store.can_redo());
        assert_eq!(h.store.redo_depth(), 0);
        assert_eq!(*h.current, 9);
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut h = Harness::new(SnapshotConfig::new(3));
        assert_eq!(h.set(1), 0);
        assert_eq!(h.set(2), 0);
        assert_eq!(h.set(3), 0);
        assert_eq!(h.set(4), 1);

        assert_eq!(h.store.undo_depth(), 3);
        let past: Vec<i32> = h.store.past().map(|s| **s).collect();
        assert_eq!(past, [1, 2, 3]);
    }

    #[test]
    fn future_is_bounded_too() {
        let mut h = Harness::new(SnapshotConfig::new(2));
        h.set(1);
        h.set(2);
        // Undo twice, then redo/undo churn must never grow future past 2.
        h.undo();
        h.undo();
        assert_eq!(h.store.redo_depth(), 2);
        h.redo();
        h.undo();
        assert_eq!(h.store.redo_depth(), 2);
    }

    #[test]
    fn redo_respects_past_bound() {
        let mut h = Harness::new(SnapshotConfig::new(2));
        h.set(1);
        h.set(2);
        h.undo();
        h.redo();
        assert_eq!(h.store.undo_depth(), 2);
        assert_eq!(*h.current, 2);
    }

    #[test]
    fn clear_removes_all() {
        let mut h = Harness::new(SnapshotConfig::default());
        h.set(1);
        h.set(2);
        h.undo();

        h.store.clear();

        assert!(h.store.is_empty());
        assert!(!h.store.can_undo());
        assert!(!h.store.can_redo());
    }

    #[test]
    fn snapshots_share_allocation() {
        let mut store = SnapshotStore::new(SnapshotConfig::new(1000));
        let data = Arc::new(vec![0u8; 1024]);
        for _ in 0..1000 {
            store.checkpoint(Arc::clone(&data));
        }
        assert_eq!(store.undo_depth(), 1000);
        assert_eq!(Arc::strong_count(&data), 1001);
    }

    #[test]
    fn config_defaults() {
        assert_eq!(SnapshotConfig::default().max_depth, 50);
        assert_eq!(SnapshotConfig::unlimited().max_depth, usize::MAX);
    }

    #[test]
    fn store_debug() {
        let mut store = SnapshotStore::with_default_config();
        store.checkpoint(Arc::new(1));
        let s = format!("{store:?}");
        assert!(s.contains("SnapshotStore"));
        assert!(s.contains("undo_depth"));
    }

    #[test]
    fn im_vector_snapshots() {
        use im::Vector;

        let mut store = SnapshotStore::with_default_config();
        let mut current: Arc<Vector<u32>> = Arc::new((0..1000).collect());

        let mut next = (*current).clone();
        next.push_back(9999);
        store.checkpoint(std::mem::replace(&mut current, Arc::new(next)));

        let prev = store.undo(&current).unwrap();
        assert_eq!(prev.len(), 1000);
        let restored = store.redo(&prev).unwrap();
        assert_eq!(restored.back(), Some(&9999));
    }
}
