//! # Cook Worker
//!
//! One task per cook: take an order from the kitchen queue, cook it in timed steps, report
//! it ready. The loop survives any error except [`ShiftError::Stopped`].

use crate::lifecycle::{CookStats, Coordinator, ShiftError};
use crate::model::OrderId;
use crate::observer::RestaurantEvent;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared view of a cook, read by the stats snapshots.
#[derive(Debug)]
pub struct CookHandle {
    pub name: String,
    cooking: AtomicBool,
    paused: AtomicBool,
    cooked: AtomicU64,
    /// Raw id of the order on the stove, 0 when idle.
    current: AtomicU32,
}

impl CookHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooking: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            cooked: AtomicU64::new(0),
            current: AtomicU32::new(0),
        }
    }

    pub fn is_cooking(&self) -> bool {
        self.cooking.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.cooking.store(false, Ordering::SeqCst);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    pub fn cooked(&self) -> u64 {
        self.cooked.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> CookStats {
        let current = self.current.load(Ordering::SeqCst);
        CookStats {
            name: self.name.clone(),
            cooking: self.is_cooking(),
            paused: self.paused.load(Ordering::SeqCst),
            cooked: self.cooked(),
            current_order: (current != 0).then_some(OrderId(current)),
        }
    }
}

pub struct CookWorker {
    coordinator: Arc<Coordinator>,
    handle: Arc<CookHandle>,
}

impl CookWorker {
    pub fn new(coordinator: Arc<Coordinator>, handle: Arc<CookHandle>) -> Self {
        Self {
            coordinator,
            handle,
        }
    }

    pub async fn run(self) {
        let name = self.handle.name.clone();
        info!(cook = %name, "Cook started");
        let cooldown = self.coordinator.config().kitchen.cook_error_cooldown();

        while self.handle.is_cooking() {
            match self.cook_next().await {
                Ok(()) => {}
                Err(ShiftError::Stopped) => break,
                Err(e) => {
                    warn!(cook = %name, error = %e, "Cooking failed");
                    self.handle.current.store(0, Ordering::SeqCst);
                    if self.coordinator.shift().sleep(cooldown).await.is_err() {
                        break;
                    }
                }
            }
        }

        self.handle.stop();
        info!(cook = %name, cooked = self.handle.cooked(), "Cook finished");
    }

    async fn cook_next(&self) -> Result<(), ShiftError> {
        let name = &self.handle.name;
        self.coordinator.check_pause().await?;
        let id = self.coordinator.take_from_kitchen_queue().await?;
        let order = self.coordinator.start_cooking(id, name).await?;
        self.handle.current.store(id.0, Ordering::SeqCst);
        debug!(cook = %name, order = %id, dish = %order.dish_name, "Cooking");

        let steps = self.coordinator.config().kitchen.cook_steps;
        let step = order.prep_time() / steps;
        for done in 1..=steps {
            self.coordinator.shift().sleep(step).await?;
            self.coordinator.check_pause().await?;
            self.coordinator.emit(RestaurantEvent::CookingProgress {
                cook: name.clone(),
                order: id,
                percent: done * 100 / steps,
            });
        }

        self.coordinator.complete_order(id, name).await?;
        self.handle.cooked.fetch_add(1, Ordering::SeqCst);
        self.handle.current.store(0, Ordering::SeqCst);
        self.coordinator
            .emit(RestaurantEvent::CookStatsChanged(self.handle.stats()));
        Ok(())
    }
}
