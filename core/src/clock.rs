//! Time sources for the breaker
//!
//! This module provides different clock implementations:
//! - `MonotonicClock`: Real monotonic time anchored at creation (immune to NTP skew)
//! - `ManualClock`: Externally driven time for deterministic tests and simulations

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of the current time in nanoseconds
///
/// Readings must be monotonically non-decreasing. The breaker does not detect
/// a clock going backwards; a window simply appears not to have elapsed yet.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in nanoseconds relative to an arbitrary fixed origin
    fn now_nanos(&self) -> u64;
}

/// Monotonic clock backed by `Instant`, relative to its own creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start_time: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to
///
/// # Example
///
/// ```rust
/// use event_count_breaker::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(Duration::from_micros(1));
/// assert_eq!(clock.now_nanos(), 2_000);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `nanos`
    pub fn new(nanos: u64) -> Self {
        Self {
            nanos: AtomicU64::new(nanos),
        }
    }

    /// Jump to an absolute reading
    pub fn set(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::Release);
    }

    /// Move forward by `delta`, saturating at `u64::MAX`
    pub fn advance(&self, delta: Duration) {
        let delta = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::Acquire)
    }
}
