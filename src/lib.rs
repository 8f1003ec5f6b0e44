//! # Restaurant Simulation
//!
//! > **A concurrent order-fulfillment pipeline on Tokio.**
//!
//! Clients place orders at a rate that rises over the shift. Waiters accept them and send
//! them to a bounded kitchen queue; cooks take them off the queue and cook them; waiters
//! carry the finished dishes out. The whole shift can be paused and resumed, and every
//! visible change is reported to an [`Observer`](observer::Observer).
//!
//! ## Architecture Notes
//!
//! ### 1. Orders live in an actor
//! Each shift runs one generic [`ResourceActor`](framework::ResourceActor) holding every
//! [`Order`](model::Order). Workers never touch an order directly; they send an
//! [`OrderAction`](order_actor::OrderAction) and get a snapshot back. Because the actor
//! handles one request at a time, "find my ready order and claim it" is a single atomic
//! step and no order is delivered twice.
//!
//! ### 2. Pause is a watch channel
//! [`ShiftState`](lifecycle::ShiftState) (`Running`, `Paused`, `Stopped`) sits in a
//! `tokio::sync::watch` channel. Workers park on it at every checkpoint, and the order
//! actor receives it as its context so it can refuse kitchen transitions during a pause.
//!
//! ### 3. Backpressure is bounded
//! The kitchen queue and each waiter's inbox are bounded `mpsc` channels. A full channel
//! is retried a fixed number of times, then the order is given up and reported.
//!
//! ### 4. Observability
//! `tracing` everywhere, with structured fields. See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`framework`]: the generic registry actor and its client.
//! - [`model`]: orders, their state machine, and the menu.
//! - [`order_actor`] and [`clients`]: the order registry built on the framework.
//! - [`lifecycle`]: [`Restaurant`](lifecycle::Restaurant), the per-shift
//!   [`Coordinator`](lifecycle::Coordinator), the shift signal and the kitchen queue.
//! - [`workers`]: cooks, waiters and the load scheduler.
//! - [`observer`], [`history`], [`config`]: the outside edges.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- --waiters 3 --cooks 2 --duration-secs 30
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod history;
pub mod lifecycle;
pub mod model;
pub mod observer;
pub mod order_actor;
pub mod workers;
