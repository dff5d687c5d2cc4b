//! Error types for breaker construction and event recording

use thiserror::Error;

/// Errors reported by the event-count circuit breaker
///
/// Configuration errors are raised once, at construction time. Once a breaker
/// exists, the only runtime error is a caller passing an empty batch to
/// [`EventCountBreaker::record_many_and_check`](crate::EventCountBreaker::record_many_and_check).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError {
    /// A check interval was configured as zero
    #[error("Circuit '{circuit}' {interval} interval must be greater than zero")]
    ZeroInterval {
        circuit: String,
        interval: &'static str,
    },
    /// A check interval does not fit into a u64 nanosecond count
    #[error("Circuit '{circuit}' {interval} interval is too large to be tracked in nanoseconds")]
    IntervalOverflow {
        circuit: String,
        interval: &'static str,
    },
    /// A batch increment was not positive
    #[error("Circuit '{circuit}' cannot record an increment of {increment} events")]
    InvalidIncrement { circuit: String, increment: u64 },
}
