//! Basic event-count breaker usage example

use event_count_breaker::{EventCountBreaker, ManualClock};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Event-Count Breaker Basic Example ===\n");

    // Drive time by hand so the example runs instantly
    let clock = Arc::new(ManualClock::new(0));
    let breaker = EventCountBreaker::builder("payment_api")
        .opening_threshold(3)
        .opening_interval(Duration::from_secs(10))
        .closing_threshold(1)
        .closing_interval(Duration::from_secs(5))
        .clock(clock.clone())
        .on_open(|name| println!("🔴 Circuit '{}' opened!", name))
        .on_close(|name| println!("🟢 Circuit '{}' closed!", name))
        .build()
        .expect("valid configuration");

    println!("Initial state: {}\n", breaker.state_name());

    println!("--- Recording events ---");
    for i in 1..=4 {
        let allowed = breaker.record_and_check();
        println!("event {} -> {}", i, if allowed { "allowed" } else { "denied" });
        clock.advance(Duration::from_secs(1));
    }
    println!("State: {} (circuit opened)\n", breaker.state_name());

    println!("--- Waiting out the closing interval ---");
    clock.advance(Duration::from_secs(5));
    println!("check -> {}", breaker.check());
    println!("State: {}\n", breaker.state_name());

    println!("--- Batch of events ---");
    match breaker.record_many_and_check(10) {
        Ok(allowed) => println!("batch -> {}", if allowed { "allowed" } else { "denied" }),
        Err(e) => println!("✗ {}", e),
    }
    if let Err(e) = breaker.record_many_and_check(0) {
        println!("✗ {}", e);
    }
    println!();

    println!("--- Manual override ---");
    breaker.close();
    println!("State after close: {}", breaker.state_name());
}
