//! Custom actions for the Order actor.
//!
//! Each action is one step of the order state machine, handled by
//! [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action).
//! Every successful action answers with a snapshot of the order after the change.

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// `Created → WaitingForCooking`. The waiter becomes the order's owner.
    Accept { waiter: String },
    /// `WaitingForCooking → Cooking`. Refused while the shift is paused.
    StartCooking { cook: String },
    /// `Cooking → Ready`. Refused while the shift is paused.
    FinishCooking,
    /// Marks a ready order as picked up by its owner. At most one claim succeeds.
    Claim { waiter: String },
    /// `Ready → Delivered`.
    Deliver,
}
