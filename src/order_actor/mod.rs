//! Order-specific resource logic: the order registry of a shift.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::OrderContext;
pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;

/// Request buffer of the registry. Every worker of a shift talks to the same actor.
const REGISTRY_BUFFER: usize = 64;

/// Creates a new Order actor and its client. Start it with
/// `tokio::spawn(actor.run(OrderContext::new(shift)))`.
pub fn new() -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(REGISTRY_BUFFER);
    let client = OrderClient::new(generic_client);
    (actor, client)
}
