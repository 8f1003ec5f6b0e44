//! # Generic Client
//!
//! The sending half of a [`ResourceActor`](super::ResourceActor).

use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::{ResourceRequest, Selector};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `ResourceActor`.
///
/// Holds only a sender, so cloning is cheap and clones can be moved into any task.
/// Every method resolves to `Result<_, FrameworkError>`:
/// [`FrameworkError::ActorClosed`] when the actor is gone before the request is sent,
/// [`FrameworkError::ActorDropped`] when it goes away before answering.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, FrameworkError>>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    /// Applies `action` to the first entity accepted by `selector`, atomically.
    pub async fn perform_action_first(
        &self,
        selector: Selector<T>,
        action: T::Action,
    ) -> Result<Option<T::ActionResult>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::ActionFirst {
            selector,
            action,
            respond_to,
        })
        .await
    }

    pub async fn list(&self, selector: Selector<T>) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List {
            selector,
            respond_to,
        })
        .await
    }

    pub async fn count(&self, selector: Selector<T>) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Count {
            selector,
            respond_to,
        })
        .await
    }

    pub async fn evict(&self, selector: Selector<T>) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Evict {
            selector,
            respond_to,
        })
        .await
    }

    pub async fn clear(&self) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Clear { respond_to })
            .await
    }
}
