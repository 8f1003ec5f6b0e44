//! # Generic Messages
//!
//! Message types exchanged between [`ResourceClient`](super::ResourceClient) and
//! [`ResourceActor`](super::ResourceActor).

use super::entity::ActorEntity;
use super::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated inside the actor against stored entities.
pub type Selector<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Requests understood by a `ResourceActor`.
///
/// Besides the per-id operations (`Create`, `Get`, `Action`) the actor supports a few
/// store-wide requests. Because the actor handles one message at a time, each of them is
/// atomic with respect to every other request:
///
/// - **ActionFirst**: find the first entity (in id order) matching a selector and apply an
///   action to it. This is how a "find and claim" becomes a single step.
/// - **List** / **Count**: read-only scans.
/// - **Evict**: remove every entity matching a selector.
/// - **Clear**: drop the whole store.
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    ActionFirst {
        selector: Selector<T>,
        action: T::Action,
        respond_to: Response<Option<T::ActionResult>>,
    },
    List {
        selector: Selector<T>,
        respond_to: Response<Vec<T>>,
    },
    Count {
        selector: Selector<T>,
        respond_to: Response<usize>,
    },
    Evict {
        selector: Selector<T>,
        respond_to: Response<usize>,
    },
    Clear {
        respond_to: Response<usize>,
    },
}
