//! # Framework Errors
//!
//! Errors raised by the actor plumbing itself, as opposed to the entity's own error type
//! which travels boxed inside [`FrameworkError::EntityError`].

#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// The request channel is closed; the actor task has ended.
    #[error("Registry actor is gone")]
    ActorClosed,
    /// The actor took the request but never answered.
    #[error("Registry actor dropped the reply")]
    ActorDropped,
    #[error("No entry with id {0}")]
    NotFound(String),
    /// A hook or action of the entity refused the request.
    #[error("Rejected by entity: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}
