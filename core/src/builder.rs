//! Builder API for ergonomic breaker configuration

use crate::{
    MonotonicClock,
    callbacks::StateListener,
    circuit::{Config, EventCountBreaker},
    clock::Clock,
    errors::BreakerError,
    window::State,
};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating event-count breakers with fluent API
pub struct BreakerBuilder {
    name: String,
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    listeners: Vec<Arc<dyn StateListener>>,
}

impl BreakerBuilder {
    /// Create a new builder for a circuit with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Config::default(),
            clock: None,
            listeners: Vec::new(),
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the number of events tolerated per opening interval
    pub fn opening_threshold(mut self, threshold: u64) -> Self {
        self.config.opening_threshold = threshold;
        self
    }

    /// Set the check interval used while closed
    pub fn opening_interval(mut self, interval: Duration) -> Self {
        self.config.opening_interval = interval;
        self
    }

    /// Set the number of events tolerated per closing interval
    /// (defaults to the opening threshold)
    pub fn closing_threshold(mut self, threshold: u64) -> Self {
        self.config.closing_threshold = Some(threshold);
        self
    }

    /// Set the check interval used while open (defaults to the opening interval)
    pub fn closing_interval(mut self, interval: Duration) -> Self {
        self.config.closing_interval = Some(interval);
        self
    }

    /// Set a custom time source
    ///
    /// # Examples
    ///
    /// ```rust
    /// use event_count_breaker::{EventCountBreaker, ManualClock};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let clock = Arc::new(ManualClock::new(0));
    /// let breaker = EventCountBreaker::builder("search")
    ///     .opening_threshold(1)
    ///     .opening_interval(Duration::from_secs(1))
    ///     .clock(clock.clone())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(breaker.record_and_check());
    /// assert!(!breaker.record_and_check());
    ///
    /// clock.advance(Duration::from_secs(1));
    /// assert!(breaker.check());
    /// ```
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Register a transition listener
    pub fn listener(mut self, listener: Arc<dyn StateListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Set callback for every state transition
    pub fn on_transition<F>(self, f: F) -> Self
    where
        F: Fn(&str, State, State) + Send + Sync + 'static,
    {
        self.listener(Arc::new(f))
    }

    /// Set callback for when circuit opens
    pub fn on_open<F>(self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_transition(move |circuit: &str, _from: State, to: State| {
            if to.is_open() {
                f(circuit);
            }
        })
    }

    /// Set callback for when circuit closes
    pub fn on_close<F>(self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_transition(move |circuit: &str, _from: State, to: State| {
            if to.is_closed() {
                f(circuit);
            }
        })
    }

    /// Build the breaker, validating thresholds and intervals
    pub fn build(self) -> Result<EventCountBreaker, BreakerError> {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        let breaker = EventCountBreaker::with_clock(self.name, self.config, clock)?;
        for listener in self.listeners {
            breaker.add_listener(listener);
        }

        Ok(breaker)
    }
}

impl std::fmt::Debug for BreakerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerBuilder")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_builder_defaults() {
        let breaker = BreakerBuilder::new("test").build().unwrap();

        assert_eq!(breaker.state_name(), "Closed");
        assert_eq!(breaker.name(), "test");
        assert_eq!(breaker.opening_threshold(), 5);
        assert_eq!(breaker.closing_threshold(), 5);
        assert_eq!(breaker.closing_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_builder_custom_config() {
        let breaker = BreakerBuilder::new("test")
            .opening_threshold(10)
            .opening_interval(Duration::from_secs(120))
            .closing_threshold(3)
            .closing_interval(Duration::from_secs(30))
            .build()
            .unwrap();

        assert!(breaker.is_closed());
        assert_eq!(breaker.opening_threshold(), 10);
        assert_eq!(breaker.opening_interval(), Duration::from_secs(120));
        assert_eq!(breaker.closing_threshold(), 3);
        assert_eq!(breaker.closing_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_builder_from_config() {
        let config = Config {
            opening_threshold: 7,
            closing_interval: Some(Duration::from_millis(250)),
            ..Default::default()
        };

        let breaker = BreakerBuilder::new("test").config(config).build().unwrap();

        assert_eq!(breaker.opening_threshold(), 7);
        assert_eq!(breaker.closing_threshold(), 7);
        assert_eq!(breaker.closing_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = BreakerBuilder::new("test")
            .opening_interval(Duration::ZERO)
            .build();

        assert!(matches!(
            result,
            Err(BreakerError::ZeroInterval {
                interval: "opening",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_with_callbacks() {
        let opened = Arc::new(AtomicBool::new(false));
        let opened_clone = opened.clone();
        let closed = Arc::new(AtomicUsize::new(0));
        let closed_clone = closed.clone();

        let clock = Arc::new(ManualClock::new(0));
        let breaker = BreakerBuilder::new("test")
            .opening_threshold(2)
            .opening_interval(Duration::from_secs(1))
            .clock(clock.clone())
            .on_open(move |_name| {
                opened_clone.store(true, Ordering::SeqCst);
            })
            .on_close(move |_name| {
                closed_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        breaker.record_and_check();
        breaker.record_and_check();
        assert!(!opened.load(Ordering::SeqCst));

        breaker.record_and_check();
        assert!(opened.load(Ordering::SeqCst));
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_secs(1));
        assert!(breaker.check());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_builder_on_transition_sees_both_states() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();

        let breaker = BreakerBuilder::new("test")
            .on_transition(move |_name: &str, from: State, to: State| {
                sink.lock().unwrap().push((from, to));
            })
            .build()
            .unwrap();

        breaker.open();
        breaker.close();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(State::Closed, State::Open), (State::Open, State::Closed)]
        );
    }
}
