//! Event-count circuit breaker
//!
//! This crate provides a circuit breaker that counts events inside rolling
//! check intervals:
//! - Opens when more than `opening_threshold` events arrive within one opening interval
//! - Closes again once a closing interval passes with at most `closing_threshold` events
//! - Lock-free state updates; every transition is reported to listeners exactly once
//! - Injectable monotonic clock for deterministic tests
//!
//! # Example
//!
//! ```rust
//! use event_count_breaker::EventCountBreaker;
//! use std::time::Duration;
//!
//! let breaker = EventCountBreaker::builder("inbound_requests")
//!     .opening_threshold(100)
//!     .opening_interval(Duration::from_secs(1))
//!     .closing_threshold(20)
//!     .closing_interval(Duration::from_secs(5))
//!     .on_open(|name| println!("Circuit {} opened!", name))
//!     .build()
//!     .expect("valid configuration");
//!
//! // Count each request and reject it when the breaker is open
//! if breaker.record_and_check() {
//!     // handle the request
//! }
//!
//! // Manual override
//! breaker.open();
//! assert!(breaker.is_open());
//! ```

pub mod builder;
pub mod callbacks;
pub mod circuit;
pub mod clock;
pub mod errors;
pub mod transition;
pub mod window;

pub use builder::BreakerBuilder;
pub use callbacks::{Notifier, StateListener};
pub use circuit::{Config, EventCountBreaker};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use errors::BreakerError;
pub use transition::{Limits, Outcome};
pub use window::{CheckWindow, State};
