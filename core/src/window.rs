//! Breaker state and check-window accounting

use std::fmt;

/// Circuit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Requests are allowed
    #[default]
    Closed,
    /// Requests are rejected
    Open,
}

impl State {
    /// The state a transition out of `self` leads to
    pub fn opposite(self) -> Self {
        match self {
            State::Closed => State::Open,
            State::Open => State::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == State::Open
    }

    pub fn is_closed(self) -> bool {
        self == State::Closed
    }

    pub fn name(self) -> &'static str {
        match self {
            State::Closed => "Closed",
            State::Open => "Open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events observed during one check interval
///
/// Windows are values: recording events produces a new window with the same
/// start, and an elapsed interval is replaced by a fresh window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckWindow {
    start: u64,
    count: u64,
}

impl CheckWindow {
    pub fn new(start: u64, count: u64) -> Self {
        Self { start, count }
    }

    /// Empty window starting at `start`
    pub fn empty(start: u64) -> Self {
        Self::new(start, 0)
    }

    /// Nanosecond timestamp the interval started at
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Events recorded in this interval
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Copy of this window with `n` more events
    pub fn increment(self, n: u64) -> Self {
        Self {
            start: self.start,
            count: self.count.saturating_add(n),
        }
    }

    /// Whether `now` still falls inside `[start, start + interval)`
    ///
    /// Timestamps before `start` (a clock running backwards) count as live.
    pub fn is_live(&self, now: u64, interval: u64) -> bool {
        now < self.start.saturating_add(interval)
    }
}

/// The `(State, CheckWindow)` pair, always published together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub state: State,
    pub window: CheckWindow,
}

impl Snapshot {
    pub fn new(state: State, window: CheckWindow) -> Self {
        Self { state, window }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_defaults_to_closed() {
        assert_eq!(State::default(), State::Closed);
        assert!(State::default().is_closed());
    }

    #[test]
    fn test_state_opposite_and_display() {
        assert_eq!(State::Closed.opposite(), State::Open);
        assert_eq!(State::Open.opposite(), State::Closed);
        assert_eq!(State::Open.to_string(), "Open");
        assert_eq!(State::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_window_increment_keeps_start() {
        let window = CheckWindow::empty(100).increment(3).increment(2);

        assert_eq!(window.start(), 100);
        assert_eq!(window.count(), 5);
    }

    #[test]
    fn test_window_liveness_boundary() {
        let window = CheckWindow::empty(1_000);

        assert!(window.is_live(1_000, 500));
        assert!(window.is_live(1_499, 500));
        assert!(!window.is_live(1_500, 500));
        // clock behind the window start
        assert!(window.is_live(10, 500));
    }

    #[test]
    fn test_window_liveness_saturates_near_max() {
        let window = CheckWindow::empty(u64::MAX - 10);

        assert!(window.is_live(u64::MAX - 1, 1_000));
    }
}
