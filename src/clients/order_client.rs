use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId, OrderStatus};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Client for interacting with the Order registry.
///
/// Every state change goes through the actor, so two workers racing on the same order
/// see exactly one success. [`OrderClient::claim_ready`] finds and claims a ready order in
/// a single request.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, order))]
    pub async fn place_order(&self, order: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?order, "place_order called");
        self.inner.create(order).await.map_err(Self::map_error)
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    pub async fn accept(&self, id: OrderId, waiter: &str) -> Result<Order, OrderError> {
        self.act(
            id,
            OrderAction::Accept {
                waiter: waiter.to_string(),
            },
        )
        .await
    }

    pub async fn start_cooking(&self, id: OrderId, cook: &str) -> Result<Order, OrderError> {
        self.act(
            id,
            OrderAction::StartCooking {
                cook: cook.to_string(),
            },
        )
        .await
    }

    pub async fn finish_cooking(&self, id: OrderId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::FinishCooking).await
    }

    /// Claims a specific ready order for `waiter`.
    pub async fn claim(&self, id: OrderId, waiter: &str) -> Result<Order, OrderError> {
        self.act(
            id,
            OrderAction::Claim {
                waiter: waiter.to_string(),
            },
        )
        .await
    }

    /// Claims the oldest ready, unclaimed order assigned to `waiter`, if any.
    #[instrument(skip(self))]
    pub async fn claim_ready(&self, waiter: &str) -> Result<Option<Order>, OrderError> {
        let owner = waiter.to_string();
        self.inner
            .perform_action_first(
                Box::new(move |order: &Order| order.is_ready_for(&owner)),
                OrderAction::Claim {
                    waiter: waiter.to_string(),
                },
            )
            .await
            .map_err(Self::map_error)
    }

    pub async fn deliver(&self, id: OrderId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Deliver).await
    }

    pub async fn count_by_status(&self, status: OrderStatus) -> Result<usize, OrderError> {
        self.inner
            .count(Box::new(move |order: &Order| order.status() == status))
            .await
            .map_err(Self::map_error)
    }

    pub async fn ready_count(&self) -> Result<usize, OrderError> {
        self.count_by_status(OrderStatus::Ready).await
    }

    /// Drops delivered orders whose cooking finished more than `max_age` ago.
    pub async fn evict_delivered_older_than(&self, max_age: Duration) -> Result<usize, OrderError> {
        let now = Instant::now();
        self.inner
            .evict(Box::new(move |order: &Order| {
                order.status() == OrderStatus::Delivered
                    && order
                        .finished_cooking_at()
                        .map(|finished| now.saturating_duration_since(finished) > max_age)
                        .unwrap_or(false)
            }))
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    /// Entity errors travel boxed through the actor and are unboxed back into `OrderError`.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
