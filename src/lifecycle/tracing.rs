//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; log lines carry structured fields instead
//! (`waiter`, `cook`, `order`, `load`).
//!
//! ```bash
//! # Shift milestones: accepted, sent to kitchen, ready, delivered
//! RUST_LOG=info cargo run
//!
//! # Every observer event and actor request
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a shift reads like:
//!
//! ```text
//! INFO Shift started waiters=3 cooks=2
//! INFO Order placed order=order_1 total=1
//! INFO Accepted order=order_1 waiter=Waiter-1
//! INFO Sent to kitchen order=order_1 waiter=Waiter-1 queued=1 load=low
//! INFO Ready order=order_1 cook=Cook-1 dish=Borscht
//! INFO Delivered order=order_1 waiter=Waiter-1 delivered=1
//! ```
//!
//! Observer events are logged through [`TracingObserver`](crate::observer::TracingObserver),
//! so the same stream shows pauses, dropped orders and load changes.

/// Installs the global subscriber. Falls back to `info` when `RUST_LOG` is unset.
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
