use crate::framework::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the store-wide operations.
///
/// Implementors supply the inner [`ResourceClient`] and an error mapping; `get`,
/// `list_all` and `clear` come for free.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Snapshot of every entity, in id order.
    async fn list_all(&self) -> Result<Vec<T>, Self::Error> {
        self.inner()
            .list(Box::new(|_: &T| true))
            .await
            .map_err(Self::map_error)
    }

    /// Drop every entity. Returns how many were removed.
    async fn clear(&self) -> Result<usize, Self::Error> {
        self.inner().clear().await.map_err(Self::map_error)
    }
}
