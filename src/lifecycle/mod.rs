//! Shift lifecycle: the [`Restaurant`] facade, the per-shift [`Coordinator`], and the
//! pieces they share.

pub mod coordinator;
pub mod error;
pub mod kitchen;
pub mod restaurant;
pub mod signal;
pub mod stats;
pub mod tracing;

pub use coordinator::Coordinator;
pub use error::{RestaurantError, ShiftError};
pub use kitchen::{KitchenQueue, LoadLevel};
pub use restaurant::Restaurant;
pub use signal::{ShiftControl, ShiftSignal, ShiftState};
pub use stats::{CookStats, ShiftStats, WaiterStats};
