//! A client's order moving through the kitchen.
//!
//! # Actor Framework
//! This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait, so the
//! shift's order registry is a [`ResourceActor`](crate::framework::ResourceActor) of orders.
//! See [`crate::order_actor`] for the actions it accepts.
//!
//! # State machine
//! `Created → WaitingForCooking → Cooking → Ready → Delivered`. Each transition method
//! checks that it is exactly one step forward and stamps its timestamp once.

use crate::model::DishCategory;
use crate::order_actor::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::Instant;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Lifecycle of an order. Variants are declared in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    WaitingForCooking,
    Cooking,
    Ready,
    Delivered,
}

impl OrderStatus {
    /// The only status this one may advance to.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::WaitingForCooking),
            OrderStatus::WaitingForCooking => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Delivered
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Created => "created",
            OrderStatus::WaitingForCooking => "waiting for cooking",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub client_name: String,
    pub dish_name: String,
    pub category: DishCategory,
    status: OrderStatus,
    created_at: Instant,
    started_cooking_at: Option<Instant>,
    finished_cooking_at: Option<Instant>,
    assigned_waiter: Option<String>,
    cook: Option<String>,
    claimed_by: Option<String>,
}

/// Payload for registering a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub client_name: String,
    pub dish_name: String,
    pub category: DishCategory,
}

impl Order {
    /// Creates an order in the `Created` state, stamped with the current time.
    pub fn new(
        id: OrderId,
        client_name: impl Into<String>,
        dish_name: impl Into<String>,
        category: DishCategory,
    ) -> Self {
        Self {
            id,
            client_name: client_name.into(),
            dish_name: dish_name.into(),
            category,
            status: OrderStatus::Created,
            created_at: Instant::now(),
            started_cooking_at: None,
            finished_cooking_at: None,
            assigned_waiter: None,
            cook: None,
            claimed_by: None,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn started_cooking_at(&self) -> Option<Instant> {
        self.started_cooking_at
    }

    pub fn finished_cooking_at(&self) -> Option<Instant> {
        self.finished_cooking_at
    }

    pub fn assigned_waiter(&self) -> Option<&str> {
        self.assigned_waiter.as_deref()
    }

    pub fn cook(&self) -> Option<&str> {
        self.cook.as_deref()
    }

    pub fn claimed_by(&self) -> Option<&str> {
        self.claimed_by.as_deref()
    }

    pub fn prep_time(&self) -> Duration {
        self.category.prep_time()
    }

    /// `Ready`, owned by `waiter` and not yet picked up.
    pub fn is_ready_for(&self, waiter: &str) -> bool {
        self.status == OrderStatus::Ready
            && self.claimed_by.is_none()
            && self.assigned_waiter.as_deref() == Some(waiter)
    }

    fn advance(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.next() != Some(to) {
            return Err(OrderError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `Created → WaitingForCooking`, owned by the accepting waiter.
    pub fn accept(&mut self, waiter: &str) -> Result<(), OrderError> {
        self.advance(OrderStatus::WaitingForCooking)?;
        self.assigned_waiter = Some(waiter.to_string());
        Ok(())
    }

    /// `WaitingForCooking → Cooking`, stamps the start of cooking.
    pub fn start_cooking(&mut self, cook: &str) -> Result<(), OrderError> {
        self.advance(OrderStatus::Cooking)?;
        self.started_cooking_at = Some(Instant::now());
        self.cook = Some(cook.to_string());
        Ok(())
    }

    /// `Cooking → Ready`, stamps the end of cooking.
    pub fn finish_cooking(&mut self) -> Result<(), OrderError> {
        self.advance(OrderStatus::Ready)?;
        self.finished_cooking_at = Some(Instant::now());
        Ok(())
    }

    /// Marks a ready order as picked up by its waiter. Does not change the status.
    pub fn claim(&mut self, waiter: &str) -> Result<(), OrderError> {
        if self.status != OrderStatus::Ready {
            return Err(OrderError::NotReady {
                id: self.id,
                status: self.status,
            });
        }
        if let Some(holder) = &self.claimed_by {
            return Err(OrderError::AlreadyClaimed {
                id: self.id,
                by: holder.clone(),
            });
        }
        if self.assigned_waiter.as_deref() != Some(waiter) {
            return Err(OrderError::NotOwner {
                id: self.id,
                waiter: waiter.to_string(),
            });
        }
        self.claimed_by = Some(waiter.to_string());
        Ok(())
    }

    /// `Ready → Delivered`.
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.advance(OrderStatus::Delivered)
    }

    /// Time spent before a cook picked the order up.
    pub fn waiting_time(&self) -> Duration {
        match self.started_cooking_at {
            Some(started) => started.saturating_duration_since(self.created_at),
            None => self.created_at.elapsed(),
        }
    }

    /// Zero until both cooking timestamps are set.
    pub fn cooking_time(&self) -> Duration {
        match (self.started_cooking_at, self.finished_cooking_at) {
            (Some(started), Some(finished)) => finished.saturating_duration_since(started),
            _ => Duration::ZERO,
        }
    }

    /// Creation to end of cooking once delivered, creation to now before that.
    pub fn total_time(&self) -> Duration {
        match (self.status, self.finished_cooking_at) {
            (OrderStatus::Delivered, Some(finished)) => {
                finished.saturating_duration_since(self.created_at)
            }
            _ => self.created_at.elapsed(),
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} for {}", self.dish_name, self.client_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> Order {
        Order::new(OrderId(1), "Ivan Ivanov", "Borscht", DishCategory::Soup)
    }

    #[test]
    fn test_status_walks_forward_one_step_at_a_time() {
        let mut status = OrderStatus::Created;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            assert!(next > status);
            status = next;
            seen.push(status);
        }
        assert_eq!(seen.len(), 5);
        assert!(status.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_lifecycle_sets_timestamps_in_order() {
        let mut order = soup();
        order.accept("Waiter-1").unwrap();
        assert_eq!(order.assigned_waiter(), Some("Waiter-1"));

        tokio::time::advance(Duration::from_millis(300)).await;
        order.start_cooking("Cook-1").unwrap();
        tokio::time::advance(Duration::from_millis(2000)).await;
        order.finish_cooking().unwrap();

        assert_eq!(order.waiting_time(), Duration::from_millis(300));
        assert_eq!(order.cooking_time(), Duration::from_millis(2000));

        order.claim("Waiter-1").unwrap();
        tokio::time::advance(Duration::from_millis(700)).await;
        order.deliver().unwrap();

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.total_time(), Duration::from_millis(2300));
    }

    #[test]
    fn test_skipping_a_state_is_rejected() {
        let mut order = soup();
        let err = order.start_cooking("Cook-1").unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                id: OrderId(1),
                from: OrderStatus::Created,
                to: OrderStatus::Cooking,
            }
        );
        assert_eq!(order.status(), OrderStatus::Created);
        assert!(order.started_cooking_at().is_none());
    }

    #[test]
    fn test_repeating_a_transition_is_rejected() {
        let mut order = soup();
        order.accept("Waiter-1").unwrap();
        assert!(order.accept("Waiter-2").is_err());
        assert_eq!(order.assigned_waiter(), Some("Waiter-1"));
    }

    #[test]
    fn test_claim_requires_ready_owner_and_is_exclusive() {
        let mut order = soup();
        order.accept("Waiter-1").unwrap();
        assert!(matches!(
            order.claim("Waiter-1"),
            Err(OrderError::NotReady { .. })
        ));

        order.start_cooking("Cook-1").unwrap();
        order.finish_cooking().unwrap();
        assert!(order.is_ready_for("Waiter-1"));
        assert!(!order.is_ready_for("Waiter-2"));

        assert!(matches!(
            order.claim("Waiter-2"),
            Err(OrderError::NotOwner { .. })
        ));
        order.claim("Waiter-1").unwrap();
        assert!(matches!(
            order.claim("Waiter-1"),
            Err(OrderError::AlreadyClaimed { .. })
        ));
        assert!(!order.is_ready_for("Waiter-1"));
    }

    #[test]
    fn test_cooking_time_is_zero_until_finished() {
        let mut order = soup();
        assert_eq!(order.cooking_time(), Duration::ZERO);
        order.accept("Waiter-1").unwrap();
        order.start_cooking("Cook-1").unwrap();
        assert_eq!(order.cooking_time(), Duration::ZERO);
    }
}
