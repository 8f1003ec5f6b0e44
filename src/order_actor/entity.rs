//! Entity trait implementation for the Order domain type.
//!
//! This module contains the [`ActorEntity`] trait implementation that enables [`Order`]
//! to be managed by the generic [`crate::framework::ResourceActor`].
//!
//! The registry is started with an [`OrderContext`] carrying the shift signal, which lets
//! the kitchen transitions see a pause without any lock around the store.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::lifecycle::ShiftSignal;
use crate::model::{Order, OrderCreate, OrderId};
use async_trait::async_trait;

/// Runtime dependencies injected into the Order actor.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub shift: ShiftSignal,
}

impl OrderContext {
    pub fn new(shift: ShiftSignal) -> Self {
        Self { shift }
    }

    fn ensure_not_paused(&self, id: OrderId) -> Result<(), OrderError> {
        if self.shift.is_paused() {
            return Err(OrderError::ShiftPaused(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    /// Blank client names become `Guest`; a blank dish is replaced by one from the category.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        let client = params.client_name.trim();
        let client = if client.is_empty() { "Guest" } else { client };
        let dish = params.dish_name.trim();
        let dish = if dish.is_empty() {
            params.category.random_dish(&mut rand::thread_rng())
        } else {
            dish
        };
        Ok(Order::new(id, client, dish, params.category))
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, OrderError> {
        match action {
            OrderAction::Accept { waiter } => self.accept(&waiter)?,
            OrderAction::StartCooking { cook } => {
                ctx.ensure_not_paused(self.id)?;
                self.start_cooking(&cook)?;
            }
            OrderAction::FinishCooking => {
                ctx.ensure_not_paused(self.id)?;
                self.finish_cooking()?;
            }
            OrderAction::Claim { waiter } => self.claim(&waiter)?,
            OrderAction::Deliver => self.deliver()?,
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::signal;
    use crate::model::{DishCategory, OrderStatus};

    fn create(client: &str, dish: &str) -> OrderCreate {
        OrderCreate {
            client_name: client.to_string(),
            dish_name: dish.to_string(),
            category: DishCategory::Salad,
        }
    }

    #[test]
    fn test_blank_names_are_filled_in() {
        let order = Order::from_create_params(OrderId(4), create("   ", "")).unwrap();
        assert_eq!(order.client_name, "Guest");
        assert!(DishCategory::Salad.dishes().contains(&order.dish_name.as_str()));
        assert_eq!(order.status(), OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_kitchen_steps_refused_while_paused() {
        let (control, shift) = signal::channel();
        let ctx = OrderContext::new(shift);
        let mut order = Order::from_create_params(OrderId(1), create("Anna", "Greek Salad")).unwrap();

        order
            .handle_action(OrderAction::Accept { waiter: "Waiter-1".into() }, &ctx)
            .await
            .unwrap();

        control.pause();
        let err = order
            .handle_action(OrderAction::StartCooking { cook: "Cook-1".into() }, &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::ShiftPaused(OrderId(1)));
        assert_eq!(order.status(), OrderStatus::WaitingForCooking);

        control.resume();
        let snapshot = order
            .handle_action(OrderAction::StartCooking { cook: "Cook-1".into() }, &ctx)
            .await
            .unwrap();
        assert_eq!(snapshot.status(), OrderStatus::Cooking);
        assert_eq!(snapshot.cook(), Some("Cook-1"));
    }
}
