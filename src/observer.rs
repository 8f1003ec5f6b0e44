//! # Observer
//!
//! The simulation never draws anything itself. It reports every visible change as a
//! [`RestaurantEvent`] to an [`Observer`]; a UI, a log, or a test can sit behind it.

use crate::lifecycle::{CookStats, LoadLevel, ShiftStats, WaiterStats};
use crate::model::{OrderId, OrderStatus};
use crate::workers::LoadMode;
use std::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantEvent {
    Log(String),
    OrderStatusChanged {
        order: OrderId,
        status: OrderStatus,
        by: String,
    },
    CookingProgress {
        cook: String,
        order: OrderId,
        percent: u32,
    },
    KitchenQueueChanged {
        len: usize,
        capacity: usize,
        level: LoadLevel,
    },
    WaiterStatsChanged(WaiterStats),
    CookStatsChanged(CookStats),
    ShiftStatsChanged(ShiftStats),
    LoadModeChanged(LoadMode),
    PauseChanged {
        paused: bool,
    },
    /// No waiter could take the order. It stays parked in the registry.
    OrderUnassigned(OrderId),
    /// The order left the pipeline without being cooked.
    OrderDropped {
        order: OrderId,
        reason: String,
    },
    OrdersEvicted(usize),
    OrderLimitReached {
        limit: u32,
    },
    OrderRejected {
        client: String,
        reason: String,
    },
    ShiftStarted {
        waiters: usize,
        cooks: usize,
    },
    ShiftEnded {
        total_orders: u32,
        delivered: u64,
    },
}

/// Receives every event of a restaurant. Called from worker tasks, so it must not block.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &RestaurantEvent);
}

/// Default observer: writes events into the `tracing` stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &RestaurantEvent) {
        match event {
            RestaurantEvent::Log(message) => info!("{}", message),
            RestaurantEvent::OrderStatusChanged { order, status, by } => {
                debug!(%order, %status, by = %by, "Order status changed")
            }
            RestaurantEvent::CookingProgress { cook, order, percent } => {
                debug!(cook = %cook, %order, percent, "Cooking")
            }
            RestaurantEvent::KitchenQueueChanged { len, capacity, level } => {
                debug!(len, capacity, %level, "Kitchen queue")
            }
            RestaurantEvent::WaiterStatsChanged(stats) => debug!(?stats, "Waiter stats"),
            RestaurantEvent::CookStatsChanged(stats) => debug!(?stats, "Cook stats"),
            RestaurantEvent::ShiftStatsChanged(stats) => debug!(?stats, "Shift stats"),
            RestaurantEvent::LoadModeChanged(mode) => info!(%mode, "Load mode changed"),
            RestaurantEvent::PauseChanged { paused } => info!(paused, "Pause state changed"),
            RestaurantEvent::OrderUnassigned(order) => {
                warn!(%order, "No waiter available, order left unassigned")
            }
            RestaurantEvent::OrderDropped { order, reason } => {
                warn!(%order, reason = %reason, "Order dropped")
            }
            RestaurantEvent::OrdersEvicted(count) => info!(count, "Evicted stale orders"),
            RestaurantEvent::OrderLimitReached { limit } => {
                warn!(limit, "Order limit reached, generation halted")
            }
            RestaurantEvent::OrderRejected { client, reason } => {
                warn!(client = %client, reason = %reason, "Order rejected")
            }
            RestaurantEvent::ShiftStarted { waiters, cooks } => {
                info!(waiters, cooks, "Shift started")
            }
            RestaurantEvent::ShiftEnded {
                total_orders,
                delivered,
            } => info!(total_orders, delivered, "Shift ended"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RestaurantEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RestaurantEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&RestaurantEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Observer for EventRecorder {
    fn notify(&self, event: &RestaurantEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_keeps_events_in_order() {
        let recorder = EventRecorder::new();
        recorder.notify(&RestaurantEvent::PauseChanged { paused: true });
        recorder.notify(&RestaurantEvent::OrderUnassigned(OrderId(7)));
        recorder.notify(&RestaurantEvent::PauseChanged { paused: false });

        assert_eq!(recorder.events().len(), 3);
        assert_eq!(
            recorder.events()[1],
            RestaurantEvent::OrderUnassigned(OrderId(7))
        );
        assert_eq!(
            recorder.count(|e| matches!(e, RestaurantEvent::PauseChanged { .. })),
            2
        );

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
