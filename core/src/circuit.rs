//! Event-count circuit breaker
//!
//! The breaker keeps its state and current check window in a single
//! atomically swappable snapshot. Queries read the snapshot, run the pure
//! transition rule and publish the result with compare-and-swap, retrying the
//! computation if another thread published first. Only the thread whose
//! publish actually changed the state notifies listeners.

use crate::{
    builder::BreakerBuilder,
    callbacks::{Notifier, StateListener},
    clock::{Clock, MonotonicClock},
    errors::BreakerError,
    transition::{self, Limits},
    window::{CheckWindow, Snapshot, State},
};
use arc_swap::{ArcSwap, Guard};
use std::sync::Arc;
use std::time::Duration;

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Events tolerated per opening interval while closed; one more opens the circuit
    pub opening_threshold: u64,

    /// Check interval used while closed
    pub opening_interval: Duration,

    /// Events tolerated per closing interval while open for the circuit to close.
    /// If None, the opening threshold is used
    pub closing_threshold: Option<u64>,

    /// Check interval used while open.
    /// If None, the opening interval is used
    pub closing_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opening_threshold: 5,
            opening_interval: Duration::from_secs(60),
            closing_threshold: None,
            closing_interval: None,
        }
    }
}

impl Config {
    /// Resolve defaults and check intervals for the circuit called `circuit`
    pub fn validate(&self, circuit: &str) -> Result<Limits, BreakerError> {
        let opening_interval = interval_nanos(circuit, "opening", self.opening_interval)?;
        let closing_interval = match self.closing_interval {
            Some(interval) => interval_nanos(circuit, "closing", interval)?,
            None => opening_interval,
        };

        Ok(Limits {
            opening_threshold: self.opening_threshold,
            opening_interval,
            closing_threshold: self.closing_threshold.unwrap_or(self.opening_threshold),
            closing_interval,
        })
    }
}

fn interval_nanos(
    circuit: &str,
    interval: &'static str,
    value: Duration,
) -> Result<u64, BreakerError> {
    if value.is_zero() {
        return Err(BreakerError::ZeroInterval {
            circuit: circuit.to_string(),
            interval,
        });
    }

    u64::try_from(value.as_nanos()).map_err(|_| BreakerError::IntervalOverflow {
        circuit: circuit.to_string(),
        interval,
    })
}

/// Circuit breaker that opens when too many events arrive within an interval
///
/// All operations take `&self`; share the breaker between threads with an `Arc`.
pub struct EventCountBreaker {
    name: String,
    limits: Limits,
    clock: Arc<dyn Clock>,
    snapshot: ArcSwap<Snapshot>,
    listeners: Notifier,
}

impl EventCountBreaker {
    /// Create a breaker driven by the real monotonic clock
    pub fn new(name: impl Into<String>, config: Config) -> Result<Self, BreakerError> {
        Self::with_clock(name, config, Arc::new(MonotonicClock::new()))
    }

    /// Create a breaker reading time from `clock`
    pub fn with_clock(
        name: impl Into<String>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BreakerError> {
        let name = name.into();
        let limits = config.validate(&name)?;
        let now = clock.now_nanos();

        Ok(Self {
            name,
            limits,
            clock,
            snapshot: ArcSwap::from_pointee(Snapshot::new(State::Closed, CheckWindow::empty(now))),
            listeners: Notifier::new(),
        })
    }

    /// Create a new breaker builder
    pub fn builder(name: impl Into<String>) -> BreakerBuilder {
        BreakerBuilder::new(name)
    }

    /// Apply pending interval expiry without recording an event
    ///
    /// Returns `true` if the circuit is closed afterwards.
    pub fn check(&self) -> bool {
        self.evaluate(0)
    }

    /// Record one event and return whether the circuit is still closed
    pub fn record_and_check(&self) -> bool {
        self.evaluate(1)
    }

    /// Record `increment` events at once
    ///
    /// A batch can open the circuit even if each of its events alone would not.
    /// An increment of zero is rejected and leaves the breaker untouched.
    pub fn record_many_and_check(&self, increment: u64) -> Result<bool, BreakerError> {
        if increment == 0 {
            tracing::warn!(circuit = %self.name, increment, "rejected empty event batch");
            return Err(BreakerError::InvalidIncrement {
                circuit: self.name.clone(),
                increment,
            });
        }

        Ok(self.evaluate(increment))
    }

    /// Force the circuit open, starting a fresh closing interval
    pub fn open(&self) {
        self.force(State::Open);
    }

    /// Force the circuit closed, starting a fresh opening interval
    pub fn close(&self) {
        self.force(State::Closed);
    }

    pub fn is_open(&self) -> bool {
        self.snapshot.load().state.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.snapshot.load().state.is_closed()
    }

    pub fn state(&self) -> State {
        self.snapshot.load().state
    }

    /// Get current state name
    pub fn state_name(&self) -> &'static str {
        self.state().name()
    }

    /// Current check window
    pub fn window(&self) -> CheckWindow {
        self.snapshot.load().window
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current reading of the breaker's clock, in nanoseconds
    pub fn now(&self) -> u64 {
        self.clock.now_nanos()
    }

    pub fn opening_threshold(&self) -> u64 {
        self.limits.opening_threshold
    }

    pub fn opening_interval(&self) -> Duration {
        Duration::from_nanos(self.limits.opening_interval)
    }

    pub fn closing_threshold(&self) -> u64 {
        self.limits.closing_threshold
    }

    pub fn closing_interval(&self) -> Duration {
        Duration::from_nanos(self.limits.closing_interval)
    }

    /// Register a transition listener; `false` if this `Arc` is already registered
    pub fn add_listener(&self, listener: Arc<dyn StateListener>) -> bool {
        self.listeners.add(listener)
    }

    /// Unregister a transition listener; `false` if it was not registered
    pub fn remove_listener(&self, listener: &Arc<dyn StateListener>) -> bool {
        self.listeners.remove(listener)
    }

    fn evaluate(&self, increment: u64) -> bool {
        let mut current = self.snapshot.load_full();

        loop {
            let now = self.clock.now_nanos();
            let outcome =
                transition::evaluate(current.state, current.window, &self.limits, now, increment);
            let next = Snapshot::new(outcome.state, outcome.window);

            // Nothing to publish, the read is the linearization point
            if next == *current {
                return outcome.verdict();
            }

            let previous = self.snapshot.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                if outcome.transitioned {
                    self.announce(current.state, outcome.state);
                } else if next.window.start() != current.window.start() {
                    tracing::debug!(
                        circuit = %self.name,
                        state = %outcome.state,
                        completed = current.window.count(),
                        "check interval rolled over"
                    );
                }
                return outcome.verdict();
            }

            current = Guard::into_inner(previous);
        }
    }

    fn force(&self, target: State) {
        let now = self.clock.now_nanos();
        let previous = self
            .snapshot
            .swap(Arc::new(Snapshot::new(target, CheckWindow::empty(now))));

        if previous.state != target {
            self.announce(previous.state, target);
        } else {
            tracing::debug!(circuit = %self.name, state = %target, "circuit already in requested state");
        }
    }

    fn announce(&self, from: State, to: State) {
        tracing::info!(circuit = %self.name, %from, %to, "circuit state changed");
        self.listeners.notify(&self.name, from, to);
    }
}

impl std::fmt::Debug for EventCountBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.load();
        f.debug_struct("EventCountBreaker")
            .field("name", &self.name)
            .field("limits", &self.limits)
            .field("state", &snapshot.state)
            .field("window", &snapshot.window)
            .field("clock", &self.clock)
            .field("listeners", &self.listeners)
            .finish()
    }
}
