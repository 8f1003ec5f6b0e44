//! Error types for the Order actor.

use crate::model::{OrderId, OrderStatus};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order cannot move from its current status to the requested one.
    #[error("Invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Only ready orders can be picked up.
    #[error("{id} is not ready (status: {status})")]
    NotReady { id: OrderId, status: OrderStatus },

    /// Another pick-up already holds the order.
    #[error("{id} was already taken by {by}")]
    AlreadyClaimed { id: OrderId, by: String },

    /// A waiter tried to pick up an order assigned to someone else.
    #[error("{id} is not assigned to {waiter}")]
    NotOwner { id: OrderId, waiter: String },

    /// Kitchen transitions are refused while the shift is paused.
    #[error("Shift is paused, {0} cannot change state")]
    ShiftPaused(OrderId),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
