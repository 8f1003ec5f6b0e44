//! The tasks that do the work of a shift: cooks, waiters and the load scheduler.
//! Each holds an `Arc<Coordinator>` and a handle whose atomics feed the stats snapshots.

pub mod cook;
pub mod scheduler;
pub mod waiter;

pub use cook::{CookHandle, CookWorker};
pub use scheduler::{ActiveClock, LoadMode, LoadScheduler};
pub use waiter::{WaiterHandle, WaiterWorker};
