//! # Shift Coordinator
//!
//! Everything a running shift shares: the kitchen queue, the order registry client, the
//! waiter and cook handles, the shift signal and the counters. Workers hold it through an
//! `Arc` and call the operations below; none of them takes a lock across an `.await`.
//!
//! ## Order flow
//!
//! ```text
//! place_order → assign_order_to_waiter → (waiter inbox) → accept_order
//!     → add_to_kitchen_queue → take_from_kitchen_queue → start_cooking → complete_order
//!     → take_ready_order → deliver_order
//! ```

use super::error::{RestaurantError, ShiftError};
use super::kitchen::KitchenQueue;
use super::signal::{ShiftSignal, ShiftState};
use super::stats::{CookStats, ShiftStats, WaiterStats};
use crate::clients::{ActorClient, OrderClient};
use crate::config::SimConfig;
use crate::history::{CookSummary, ShiftSummary, WaiterSummary};
use crate::model::{Order, OrderCreate, OrderId, OrderStatus};
use crate::observer::{Observer, RestaurantEvent};
use crate::order_actor::OrderError;
use crate::workers::{CookHandle, LoadMode, WaiterHandle};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shift counters. Each is independent; readers may see them mid-update.
#[derive(Debug, Default)]
struct ShiftCounters {
    total: AtomicU32,
    waiting: AtomicU64,
    cooking: AtomicU64,
    delivered: AtomicU64,
    unassigned: AtomicU64,
    abandoned: AtomicU64,
    dropped: AtomicU64,
}

fn decrement(counter: &AtomicU64) {
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}

pub struct Coordinator {
    config: SimConfig,
    shift: ShiftSignal,
    orders: OrderClient,
    kitchen: KitchenQueue,
    waiters: Vec<Arc<WaiterHandle>>,
    cooks: Vec<Arc<CookHandle>>,
    observer: Arc<dyn Observer>,
    counters: ShiftCounters,
    load_mode: AtomicU8,
    limit_notified: AtomicBool,
    unassigned: Mutex<Vec<OrderId>>,
}

impl Coordinator {
    pub fn new(
        config: SimConfig,
        shift: ShiftSignal,
        orders: OrderClient,
        observer: Arc<dyn Observer>,
        waiters: Vec<Arc<WaiterHandle>>,
        cooks: Vec<Arc<CookHandle>>,
    ) -> Self {
        let kitchen = KitchenQueue::new(config.kitchen.capacity);
        Self {
            config,
            shift,
            orders,
            kitchen,
            waiters,
            cooks,
            observer,
            counters: ShiftCounters::default(),
            load_mode: AtomicU8::new(LoadMode::Normal as u8),
            limit_notified: AtomicBool::new(false),
            unassigned: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn shift(&self) -> &ShiftSignal {
        &self.shift
    }

    pub fn kitchen(&self) -> &KitchenQueue {
        &self.kitchen
    }

    pub fn order_client(&self) -> &OrderClient {
        &self.orders
    }

    pub fn emit(&self, event: RestaurantEvent) {
        self.observer.notify(&event);
    }

    /// Pause checkpoint shared by every worker.
    pub async fn check_pause(&self) -> Result<(), ShiftError> {
        self.shift.check_pause().await
    }

    pub fn load_mode(&self) -> LoadMode {
        match self.load_mode.load(Ordering::SeqCst) {
            0 => LoadMode::Normal,
            1 => LoadMode::High,
            _ => LoadMode::Peak,
        }
    }

    pub fn set_load_mode(&self, mode: LoadMode) {
        let previous = self.load_mode.swap(mode as u8, Ordering::SeqCst);
        if previous != mode as u8 {
            self.emit(RestaurantEvent::LoadModeChanged(mode));
        }
    }

    pub fn total_orders(&self) -> u32 {
        self.counters.total.load(Ordering::SeqCst)
    }

    pub fn remaining_orders(&self) -> u32 {
        self.config
            .kitchen
            .max_total_orders
            .saturating_sub(self.total_orders())
    }

    /// Emits [`RestaurantEvent::OrderLimitReached`] the first time it is called.
    pub fn notify_limit_reached(&self) {
        if !self.limit_notified.swap(true, Ordering::SeqCst) {
            self.emit(RestaurantEvent::OrderLimitReached {
                limit: self.config.kitchen.max_total_orders,
            });
        }
    }

    /// Registers a new order against the shift cap. Both counters move before the registry
    /// call so that a cancelled caller leaves them balanced.
    pub async fn place_order(&self, order: OrderCreate) -> Result<OrderId, RestaurantError> {
        let limit = self.config.kitchen.max_total_orders;
        let reserved = self
            .counters
            .total
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < limit).then_some(n + 1)
            });
        if reserved.is_err() {
            return Err(RestaurantError::OrderLimitReached { limit });
        }
        self.counters.waiting.fetch_add(1, Ordering::SeqCst);

        let id = match self.orders.place_order(order).await {
            Ok(id) => id,
            Err(e) => {
                self.counters.total.fetch_sub(1, Ordering::SeqCst);
                decrement(&self.counters.waiting);
                return Err(e.into());
            }
        };
        info!(order = %id, total = self.total_orders(), "Order placed");
        self.emit(RestaurantEvent::OrderStatusChanged {
            order: id,
            status: OrderStatus::Created,
            by: "client".to_string(),
        });
        Ok(id)
    }

    /// Hands the order to the working waiter with the fewest current orders, the first one
    /// on ties. Returns the waiter's name, or `None` when the order was parked or abandoned.
    pub async fn assign_order_to_waiter(&self, id: OrderId) -> Result<Option<String>, ShiftError> {
        let candidate = self
            .waiters
            .iter()
            .filter(|waiter| waiter.can_take_more())
            .min_by_key(|waiter| waiter.current_orders());

        let Some(waiter) = candidate else {
            self.park_unassigned(id);
            return Ok(None);
        };

        let config = &self.config.waiter;
        match waiter
            .offer(id, &self.shift, config.busy_retry(), config.busy_timeout())
            .await
        {
            Ok(true) => {
                debug!(order = %id, waiter = %waiter.name, "Assigned");
                Ok(Some(waiter.name.clone()))
            }
            Ok(false) => {
                self.abandon_order(id, &waiter.name);
                Ok(None)
            }
            Err(e) => {
                self.park_unassigned(id);
                Err(e)
            }
        }
    }

    fn park_unassigned(&self, id: OrderId) {
        self.unassigned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(id);
        self.counters.unassigned.fetch_add(1, Ordering::SeqCst);
        self.emit(RestaurantEvent::OrderUnassigned(id));
    }

    /// The waiter gave up on the order before accepting it.
    pub fn abandon_order(&self, id: OrderId, waiter: &str) {
        self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
        self.emit(RestaurantEvent::OrderDropped {
            order: id,
            reason: format!("abandoned by {}: waiter at capacity", waiter),
        });
    }

    /// The order was accepted but never reached the kitchen.
    pub fn drop_order(&self, id: OrderId, waiter: &str, error: &ShiftError) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
        self.emit(RestaurantEvent::OrderDropped {
            order: id,
            reason: format!("{} could not send it to the kitchen: {}", waiter, error),
        });
    }

    /// `Created → WaitingForCooking` on behalf of `waiter`.
    pub async fn accept_order(&self, id: OrderId, waiter: &str) -> Result<(), ShiftError> {
        self.orders.accept(id, waiter).await?;
        info!(order = %id, waiter = %waiter, "Accepted");
        self.emit(RestaurantEvent::OrderStatusChanged {
            order: id,
            status: OrderStatus::WaitingForCooking,
            by: waiter.to_string(),
        });
        Ok(())
    }

    /// Puts an accepted order in the kitchen queue.
    ///
    /// A full queue is waited on for one retry interval per attempt. Fails without
    /// inserting once the attempts run out, or as soon as the shift is paused or stopped.
    pub async fn add_to_kitchen_queue(&self, id: OrderId, waiter: &str) -> Result<(), ShiftError> {
        let attempts = self.config.kitchen.enqueue_attempts;
        let retry = self.config.kitchen.enqueue_retry();

        for attempt in 1..=attempts {
            match self.shift.state() {
                ShiftState::Stopped => return Err(ShiftError::Stopped),
                ShiftState::Paused => return Err(ShiftError::Paused),
                ShiftState::Running => {}
            }

            let pushed = tokio::select! {
                result = self.kitchen.push_timeout(id, retry) => result.is_ok(),
                _ = self.shift.stopped() => return Err(ShiftError::Stopped),
            };
            if pushed {
                decrement(&self.counters.waiting);
                self.counters.cooking.fetch_add(1, Ordering::SeqCst);
                let level = self.kitchen.load_level();
                info!(
                    order = %id,
                    waiter = %waiter,
                    queued = self.kitchen.len(),
                    load = %level,
                    "Sent to kitchen"
                );
                self.emit_kitchen_changed();
                return Ok(());
            }
            debug!(order = %id, attempt, "Kitchen queue full");
        }

        warn!(order = %id, attempts, "Kitchen queue stayed full");
        Err(ShiftError::KitchenFull {
            order: id,
            attempts,
        })
    }

    /// Blocking take for cooks. A stop interrupts the wait.
    pub async fn take_from_kitchen_queue(&self) -> Result<OrderId, ShiftError> {
        self.check_pause().await?;
        let id = tokio::select! {
            id = self.kitchen.pop() => id.ok_or(ShiftError::Stopped)?,
            _ = self.shift.stopped() => return Err(ShiftError::Stopped),
        };
        self.emit_kitchen_changed();
        Ok(id)
    }

    /// `WaitingForCooking → Cooking`. A refusal because of a pause waits at the checkpoint
    /// and tries again.
    pub async fn start_cooking(&self, id: OrderId, cook: &str) -> Result<Order, ShiftError> {
        loop {
            self.check_pause().await?;
            match self.orders.start_cooking(id, cook).await {
                Ok(order) => {
                    self.emit(RestaurantEvent::OrderStatusChanged {
                        order: id,
                        status: OrderStatus::Cooking,
                        by: cook.to_string(),
                    });
                    return Ok(order);
                }
                Err(OrderError::ShiftPaused(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// `Cooking → Ready`. The order becomes claimable by its waiter.
    pub async fn complete_order(&self, id: OrderId, cook: &str) -> Result<Order, ShiftError> {
        let order = loop {
            self.check_pause().await?;
            match self.orders.finish_cooking(id).await {
                Ok(order) => break order,
                Err(OrderError::ShiftPaused(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        };
        decrement(&self.counters.cooking);
        info!(order = %id, cook = %cook, dish = %order.dish_name, "Ready");
        self.emit(RestaurantEvent::OrderStatusChanged {
            order: id,
            status: OrderStatus::Ready,
            by: cook.to_string(),
        });
        Ok(order)
    }

    /// Claims the oldest ready order owned by `waiter`. At most one caller gets a given order.
    pub async fn take_ready_order(&self, waiter: &str) -> Result<Option<Order>, ShiftError> {
        Ok(self.orders.claim_ready(waiter).await?)
    }

    /// Claims a ready order by id. `false` if it was not ready, not owned, or already taken.
    pub async fn mark_order_as_taken(&self, id: OrderId, waiter: &str) -> bool {
        match self.orders.claim(id, waiter).await {
            Ok(_) => true,
            Err(e) => {
                debug!(order = %id, waiter = %waiter, error = %e, "Claim refused");
                false
            }
        }
    }

    /// `Ready → Delivered`. Every few deliveries, old delivered orders are swept out.
    pub async fn deliver_order(&self, id: OrderId, waiter: &str) -> Result<Order, ShiftError> {
        let order = self.orders.deliver(id).await?;
        let delivered = self.counters.delivered.fetch_add(1, Ordering::SeqCst) + 1;
        info!(order = %id, waiter = %waiter, delivered, "Delivered");
        self.emit(RestaurantEvent::OrderStatusChanged {
            order: id,
            status: OrderStatus::Delivered,
            by: waiter.to_string(),
        });

        if delivered % self.config.kitchen.eviction_every == 0 {
            self.evict_stale().await;
        }
        Ok(order)
    }

    async fn evict_stale(&self) {
        match self
            .orders
            .evict_delivered_older_than(self.config.kitchen.eviction_age())
            .await
        {
            Ok(0) => {}
            Ok(count) => self.emit(RestaurantEvent::OrdersEvicted(count)),
            Err(e) => warn!(error = %e, "Stale order sweep failed"),
        }
    }

    fn emit_kitchen_changed(&self) {
        self.emit(RestaurantEvent::KitchenQueueChanged {
            len: self.kitchen.len(),
            capacity: self.kitchen.capacity(),
            level: self.kitchen.load_level(),
        });
    }

    pub fn unassigned_orders(&self) -> Vec<OrderId> {
        self.unassigned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_workers_paused(&self, paused: bool) {
        for waiter in &self.waiters {
            waiter.set_paused(paused);
        }
        for cook in &self.cooks {
            cook.set_paused(paused);
        }
    }

    pub fn stop_workers(&self) {
        for waiter in &self.waiters {
            waiter.stop();
        }
        for cook in &self.cooks {
            cook.stop();
        }
    }

    pub async fn stats(&self) -> Result<ShiftStats, ShiftError> {
        let ready = self.orders.ready_count().await? as u64;
        Ok(self.snapshot(ready))
    }

    fn snapshot(&self, ready: u64) -> ShiftStats {
        ShiftStats {
            total_orders: self.total_orders(),
            waiting: self.counters.waiting.load(Ordering::SeqCst),
            cooking: self.counters.cooking.load(Ordering::SeqCst),
            ready,
            delivered: self.counters.delivered.load(Ordering::SeqCst),
            unassigned: self.counters.unassigned.load(Ordering::SeqCst),
            abandoned: self.counters.abandoned.load(Ordering::SeqCst),
            dropped: self.counters.dropped.load(Ordering::SeqCst),
            kitchen_len: self.kitchen.len(),
            kitchen_capacity: self.kitchen.capacity(),
            kitchen_load: self.kitchen.load_level(),
            load_mode: self.load_mode(),
            paused: self.shift.is_paused(),
        }
    }

    pub fn waiter_stats(&self) -> Vec<WaiterStats> {
        self.waiters.iter().map(|waiter| waiter.stats()).collect()
    }

    pub fn cook_stats(&self) -> Vec<CookStats> {
        self.cooks.iter().map(|cook| cook.stats()).collect()
    }

    pub async fn orders(&self) -> Result<Vec<Order>, ShiftError> {
        Ok(self.orders.list_all().await?)
    }

    /// Final counters of the shift. Without a registry to count ready orders, the ready
    /// figure is whatever the other counters leave unaccounted for.
    pub async fn summary(&self, started_at: DateTime<Local>, duration: Duration) -> ShiftSummary {
        let stats = match self.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Order registry unavailable, inferring ready count");
                let known = self.counters.waiting.load(Ordering::SeqCst)
                    + self.counters.cooking.load(Ordering::SeqCst)
                    + self.counters.delivered.load(Ordering::SeqCst);
                self.snapshot(u64::from(self.total_orders()).saturating_sub(known))
            }
        };
        ShiftSummary {
            started_at,
            duration,
            total_orders: stats.total_orders,
            waiting: stats.waiting,
            cooking: stats.cooking,
            ready: stats.ready,
            delivered: stats.delivered,
            unassigned: stats.unassigned,
            abandoned: stats.abandoned,
            dropped: stats.dropped,
            final_load_mode: stats.load_mode,
            waiters: self
                .waiters
                .iter()
                .map(|w| WaiterSummary {
                    name: w.name.clone(),
                    accepted: w.accepted(),
                    served: w.served(),
                })
                .collect(),
            cooks: self
                .cooks
                .iter()
                .map(|c| CookSummary {
                    name: c.name.clone(),
                    cooked: c.cooked(),
                })
                .collect(),
        }
    }

    /// Empties the kitchen queue, the parked orders and the registry.
    pub async fn drain(&self) -> Result<usize, ShiftError> {
        let queued = self.kitchen.drain().await.len();
        self.unassigned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        let registered = self.orders.clear().await?;
        debug!(queued, registered, "Shift drained");
        Ok(registered)
    }
}
