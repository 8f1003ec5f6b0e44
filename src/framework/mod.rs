//! Generic actor framework for resource registries.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns the entity store
//! - [`ResourceClient`] - Cloneable, type-safe handle for talking to the actor
//! - [`FrameworkError`] - Plumbing errors (closed channels, missing ids)
//! - [`mock::MockClient`] - Scripted client for testing wrappers without an actor

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response, Selector};
