//! # ActorEntity Trait
//!
//! The contract a resource must satisfy to be managed by the generic [`ResourceActor`](super::ResourceActor).
//! It fixes the associated types for ids, creation payloads, actions, context and errors,
//! and exposes the lifecycle hooks the actor calls (`on_create`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`] defaults to `Ok(())`.
//!
//! Implement [`ActorEntity::handle_action`] to give the resource its state machine.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// Trait that any resource entity must implement to be managed by a `ResourceActor`.
///
/// # Async & Context
/// Hooks are `#[async_trait]` and receive the `Context` that was handed to
/// [`ResourceActor::run`](super::ResourceActor::run). Dependencies are bound late, when the
/// actor is started, not when it is constructed.
///
/// # Ordering
/// Ids must be `Ord`: the actor keeps its store sorted so that scans visit entities in
/// creation order.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity. Generated from a `u32` counter.
    type Id: Ord + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Enum of resource-specific operations (e.g. `StartCooking`).
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context injected into the actor. Use `()` if nothing is needed.
    type Context: Send + Sync;

    /// The per-actor error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the generated id and the payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a resource-specific action. A returned error leaves the stored entity untouched
    /// only if the implementation did not mutate it before failing.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
