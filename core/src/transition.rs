//! Pure transition rule for the event-count breaker
//!
//! [`evaluate`] computes the next `(State, CheckWindow)` pair from the current
//! one without touching shared state. The breaker re-runs it whenever its
//! compare-and-swap loses a race, so it must stay free of side effects.

use crate::window::{CheckWindow, State};

/// Validated thresholds and intervals, intervals in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub opening_threshold: u64,
    pub opening_interval: u64,
    pub closing_threshold: u64,
    pub closing_interval: u64,
}

impl Limits {
    /// Interval the window is measured against in `state`
    pub fn interval(&self, state: State) -> u64 {
        match state {
            State::Closed => self.opening_interval,
            State::Open => self.closing_interval,
        }
    }

    /// Threshold the window count is compared with in `state`
    pub fn threshold(&self, state: State) -> u64 {
        match state {
            State::Closed => self.opening_threshold,
            State::Open => self.closing_threshold,
        }
    }
}

/// Result of applying the transition rule once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub state: State,
    pub window: CheckWindow,
    pub transitioned: bool,
}

impl Outcome {
    /// `true` means allow: the breaker is closed after the evaluation
    pub fn verdict(&self) -> bool {
        self.state.is_closed()
    }
}

/// Apply `increment` events observed at `now` to `(state, window)`
pub fn evaluate(
    state: State,
    window: CheckWindow,
    limits: &Limits,
    now: u64,
    increment: u64,
) -> Outcome {
    let threshold = limits.threshold(state);

    let (next_state, next_window) = if window.is_live(now, limits.interval(state)) {
        let window = window.increment(increment);
        if state.is_closed() && window.count() > threshold {
            (State::Open, CheckWindow::empty(now))
        } else {
            (state, window)
        }
    } else {
        // Judge the completed interval, then start counting afresh
        let judged = match state {
            State::Closed if window.count() > threshold => State::Open,
            State::Open if window.count() <= threshold => State::Closed,
            unchanged => unchanged,
        };

        // A closed breaker judges its fresh window too; a breaker that just
        // closed reports that transition first
        if state.is_closed() && judged.is_closed() && increment > limits.opening_threshold {
            (State::Open, CheckWindow::empty(now))
        } else {
            (judged, CheckWindow::new(now, increment))
        }
    };

    Outcome {
        state: next_state,
        window: next_window,
        transitioned: next_state != state,
    }
}
