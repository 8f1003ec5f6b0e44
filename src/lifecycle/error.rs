//! Error types for the shift coordinator and the restaurant facade.

use crate::config::ConfigError;
use crate::model::OrderId;
use crate::order_actor::OrderError;
use thiserror::Error;

/// Errors seen by workers while a shift runs. `Stopped` is the normal way out of a loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShiftError {
    #[error("Shift stopped")]
    Stopped,

    #[error("Shift paused")]
    Paused,

    /// The kitchen queue stayed full through every retry.
    #[error("Kitchen queue full, {order} was not enqueued after {attempts} attempts")]
    KitchenFull { order: OrderId, attempts: u32 },

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Errors returned by [`Restaurant`](super::Restaurant) to its caller.
#[derive(Debug, Error)]
pub enum RestaurantError {
    #[error("Restaurant is already running")]
    AlreadyRunning,

    #[error("Restaurant is not running")]
    NotRunning,

    #[error("Restaurant is paused")]
    Paused,

    #[error("Order limit of {limit} reached for this shift")]
    OrderLimitReached { limit: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Shift(#[from] ShiftError),
}
