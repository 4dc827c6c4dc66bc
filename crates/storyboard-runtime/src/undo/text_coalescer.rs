#![forbid(unsafe_code)]

//! Debounced coalescing of keystroke-level text edits.
//!
//! A burst of edits to the same target collapses into one undo step. The
//! coalescer is a small deterministic state machine: callers pass `now` on
//! every call, so tests can drive it with synthetic instants.
//!
//! # State Machine
//!
//! ```text
//! Idle ──feed(k)──▶ Pending { key: k, base, last_edit }
//!
//! Pending(k) ──feed(k), quiet < window──▶ Pending(k)      (extends burst)
//! Pending(k) ──feed(k), quiet ≥ window──▶ Pending(k)'     (settles old burst)
//! Pending(k) ──feed(j), j ≠ k──────────▶ Pending(j)       (settles old burst)
//! Pending    ──check_timeout, quiet ≥ window──▶ Idle       (settles burst)
//! Pending    ──flush──▶ Idle                               (settles burst)
//! ```
//!
//! "Quiet" is the time since the last edit of the burst: every edit restarts
//! the window.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

/// Default quiet period before a text burst settles.
pub const DEFAULT_TEXT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A finished burst, ready to become a history checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledBurst<K, S> {
    /// Target all edits in the burst applied to.
    pub key: K,
    /// State captured before the first edit of the burst.
    pub base: S,
    /// Number of edits folded into the burst.
    pub edits: usize,
    /// When the first edit arrived.
    pub started_at: Instant,
    /// When the last edit arrived.
    pub last_edit: Instant,
}

impl<K, S> SettledBurst<K, S> {
    /// Wall time covered by the burst.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.last_edit.saturating_duration_since(self.started_at)
    }
}

enum CoalescerState<K, S> {
    Idle,
    Pending(SettledBurst<K, S>),
}

/// Debounce state machine over keyed edits.
pub struct TextCoalescer<K, S> {
    window: Duration,
    state: CoalescerState<K, S>,
}

impl<K: fmt::Debug, S> fmt::Debug for TextCoalescer<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = match &self.state {
            CoalescerState::Idle => None,
            CoalescerState::Pending(burst) => Some((&burst.key, burst.edits)),
        };
        f.debug_struct("TextCoalescer")
            .field("window", &self.window)
            .field("pending", &pending)
            .finish()
    }
}

impl<K: PartialEq, S> Default for TextCoalescer<K, S> {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_DEBOUNCE)
    }
}

impl<K: PartialEq, S> TextCoalescer<K, S> {
    /// Create an idle coalescer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: CoalescerState::Idle,
        }
    }

    /// Record an edit to `key`. `before` is the state prior to this edit and
    /// is only kept when the edit opens a new burst.
    ///
    /// Returns the previous burst when this edit could not join it.
    pub fn feed(&mut self, key: K, before: S, now: Instant) -> Option<SettledBurst<K, S>> {
        if let CoalescerState::Pending(burst) = &mut self.state
            && burst.key == key
            && now.saturating_duration_since(burst.last_edit) < self.window
        {
            burst.last_edit = now;
            burst.edits += 1;
            return None;
        }

        let fresh = CoalescerState::Pending(SettledBurst {
            key,
            base: before,
            edits: 1,
            started_at: now,
            last_edit: now,
        });
        match std::mem::replace(&mut self.state, fresh) {
            CoalescerState::Idle => None,
            CoalescerState::Pending(old) => Some(old),
        }
    }

    /// Settle the pending burst if its quiet window has elapsed.
    ///
    /// Call this periodically (e.g. on tick).
    pub fn check_timeout(&mut self, now: Instant) -> Option<SettledBurst<K, S>> {
        match &self.state {
            CoalescerState::Pending(burst)
                if now.saturating_duration_since(burst.last_edit) >= self.window =>
            {
                self.flush()
            }
            _ => None,
        }
    }

    /// Settle the pending burst immediately.
    pub fn flush(&mut self) -> Option<SettledBurst<K, S>> {
        match std::mem::replace(&mut self.state, CoalescerState::Idle) {
            CoalescerState::Idle => None,
            CoalescerState::Pending(burst) => Some(burst),
        }
    }

    /// Whether a burst is open.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, CoalescerState::Pending(_))
    }

    /// The open burst, as it would settle right now.
    #[must_use]
    pub fn pending(&self) -> Option<&SettledBurst<K, S>> {
        match &self.state {
            CoalescerState::Idle => None,
            CoalescerState::Pending(burst) => Some(burst),
        }
    }

    /// Target of the open burst.
    #[must_use]
    pub fn pending_key(&self) -> Option<&K> {
        self.pending().map(|burst| &burst.key)
    }

    /// Instant at which the open burst will settle if no edit arrives.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending().map(|burst| burst.last_edit + self.window)
    }

    /// Quiet window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the quiet window. An open burst is judged by the new window.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_feed_opens_burst() {
        let mut c = TextCoalescer::<u8, &str>::default();
        let t0 = Instant::now();
        assert!(c.feed(1, "a", t0).is_none());
        assert!(c.is_pending());
        assert_eq!(c.pending_key(), Some(&1));
        assert_eq!(c.deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn same_key_within_window_extends() {
        let mut c = TextCoalescer::<u8, &str>::default();
        let t0 = Instant::now();
        c.feed(1, "base", t0);
        for step in 1..20u64 {
            assert!(c.feed(1, "later", t0 + ms(step * 100)).is_none());
        }
        let burst = c.flush().unwrap();
        assert_eq!(burst.base, "base");
        assert_eq!(burst.edits, 20);
        assert_eq!(burst.span(), ms(1900));
    }

    #[test]
    fn window_restarts_on_every_edit() {
        let mut c = TextCoalescer::<u8, ()>::default();
        let t0 = Instant::now();
        c.feed(1, (), t0);
        c.feed(1, (), t0 + ms(400));
        assert!(c.check_timeout(t0 + ms(800)).is_none());
        assert!(c.check_timeout(t0 + ms(900)).is_some());
        assert!(!c.is_pending());
    }

    #[test]
    fn other_key_settles_previous() {
        let mut c = TextCoalescer::<u8, &str>::default();
        let t0 = Instant::now();
        c.feed(1, "one", t0);
        let settled = c.feed(2, "two", t0 + ms(10)).unwrap();
        assert_eq!(settled.key, 1);
        assert_eq!(settled.base, "one");
        assert_eq!(c.pending_key(), Some(&2));
    }

    #[test]
    fn same_key_after_window_rolls_over() {
        let mut c = TextCoalescer::<u8, &str>::default();
        let t0 = Instant::now();
        c.feed(1, "old", t0);
        let settled = c.feed(1, "new", t0 + ms(500)).unwrap();
        assert_eq!(settled.base, "old");
        assert_eq!(c.flush().unwrap().base, "new");
    }

    #[test]
    fn timeout_fires_at_exact_window() {
        let mut c = TextCoalescer::<u8, ()>::new(ms(200));
        let t0 = Instant::now();
        c.feed(1, (), t0);
        assert!(c.check_timeout(t0 + ms(199)).is_none());
        assert!(c.check_timeout(t0 + ms(200)).is_some());
    }

    #[test]
    fn idle_operations_are_noops() {
        let mut c = TextCoalescer::<u8, ()>::default();
        assert!(c.flush().is_none());
        assert!(c.check_timeout(Instant::now()).is_none());
        assert!(c.deadline().is_none());
        assert!(c.pending_key().is_none());
    }

    #[test]
    fn set_window_applies_to_open_burst() {
        let mut c = TextCoalescer::<u8, ()>::default();
        let t0 = Instant::now();
        c.feed(1, (), t0);
        c.set_window(ms(100));
        assert_eq!(c.window(), ms(100));
        assert!(c.check_timeout(t0 + ms(100)).is_some());
    }

    #[test]
    fn debug_shows_pending() {
        let mut c = TextCoalescer::<u8, ()>::default();
        c.feed(7, (), Instant::now());
        let s = format!("{c:?}");
        assert!(s.contains("TextCoalescer"));
        assert!(s.contains('7'));
    }
}
