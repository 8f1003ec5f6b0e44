//! # Waiter Worker
//!
//! Each waiter runs two tasks. The acceptance loop takes orders from the waiter's private
//! inbox, enforces the caps, and passes them to the kitchen. The delivery loop claims the
//! waiter's ready orders and carries them out.

use crate::config::WaiterConfig;
use crate::lifecycle::{Coordinator, ShiftError, ShiftSignal, WaiterStats};
use crate::model::OrderId;
use crate::observer::RestaurantEvent;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Shared view of a waiter: its inbox sender and its counters.
#[derive(Debug)]
pub struct WaiterHandle {
    pub name: String,
    inbox: mpsc::Sender<OrderId>,
    working: AtomicBool,
    paused: AtomicBool,
    current_orders: AtomicU32,
    accepted: AtomicU64,
    served: AtomicU64,
    total_handled: AtomicU32,
    concurrency_cap: u32,
    lifetime_cap: u32,
}

impl WaiterHandle {
    /// Creates the handle and the receiving end of its inbox.
    pub fn new(name: impl Into<String>, config: &WaiterConfig) -> (Self, mpsc::Receiver<OrderId>) {
        let (inbox, rx) = mpsc::channel(config.queue_capacity.max(1));
        let handle = Self {
            name: name.into(),
            inbox,
            working: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            current_orders: AtomicU32::new(0),
            accepted: AtomicU64::new(0),
            served: AtomicU64::new(0),
            total_handled: AtomicU32::new(0),
            concurrency_cap: config.concurrency_cap,
            lifetime_cap: config.lifetime_cap,
        };
        (handle, rx)
    }

    pub fn is_working(&self) -> bool {
        self.working.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.working.store(false, Ordering::SeqCst);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    pub fn current_orders(&self) -> u32 {
        self.current_orders.load(Ordering::SeqCst)
    }

    pub fn at_concurrency_cap(&self) -> bool {
        self.current_orders() >= self.concurrency_cap
    }

    /// Has handled as many orders as it ever will this shift.
    pub fn at_lifetime_cap(&self) -> bool {
        self.total_handled.load(Ordering::SeqCst) >= self.lifetime_cap
    }

    /// Working, under the concurrency cap, and not yet at the lifetime cap.
    pub fn can_take_more(&self) -> bool {
        self.is_working() && !self.at_concurrency_cap() && !self.at_lifetime_cap()
    }

    /// Puts an order in the inbox. A full inbox is retried every `retry` for as many
    /// retries as fit in `timeout`; `Ok(false)` means the order was abandoned.
    pub async fn offer(
        &self,
        id: OrderId,
        shift: &ShiftSignal,
        retry: Duration,
        timeout: Duration,
    ) -> Result<bool, ShiftError> {
        let mut retries = retry_budget(retry, timeout);
        let mut id = id;
        loop {
            match self.inbox.try_send(id) {
                Ok(()) => return Ok(true),
                Err(mpsc::error::TrySendError::Closed(_)) => return Ok(false),
                Err(mpsc::error::TrySendError::Full(back)) => id = back,
            }
            if retries == 0 {
                return Ok(false);
            }
            retries -= 1;
            shift.sleep(retry).await?;
            shift.check_pause().await?;
        }
    }

    fn begin_order(&self) {
        self.current_orders.fetch_add(1, Ordering::SeqCst);
        self.accepted.fetch_add(1, Ordering::SeqCst);
        self.total_handled.fetch_add(1, Ordering::SeqCst);
    }

    fn release_order(&self) {
        let _ = self
            .current_orders
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    fn finish_delivery(&self) {
        self.release_order();
        self.served.fetch_add(1, Ordering::SeqCst);
    }

    pub fn served(&self) -> u64 {
        self.served.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> WaiterStats {
        let current = self.current_orders();
        WaiterStats {
            name: self.name.clone(),
            working: self.is_working(),
            paused: self.paused.load(Ordering::SeqCst),
            current_orders: current,
            concurrency_cap: self.concurrency_cap,
            accepted: self.accepted(),
            served: self.served(),
            total_handled: self.total_handled.load(Ordering::SeqCst),
            load_percent: if self.concurrency_cap == 0 {
                100
            } else {
                current * 100 / self.concurrency_cap
            },
        }
    }
}

/// Retries that fit in a busy-wait budget. Only the retry sleeps are counted, so time
/// spent parked at a pause does not use up the budget.
fn retry_budget(retry: Duration, timeout: Duration) -> u32 {
    let per_retry = retry.as_millis().max(1);
    u32::try_from(timeout.as_millis() / per_retry).unwrap_or(u32::MAX)
}

#[derive(Clone)]
pub struct WaiterWorker {
    coordinator: Arc<Coordinator>,
    handle: Arc<WaiterHandle>,
}

impl WaiterWorker {
    pub fn new(coordinator: Arc<Coordinator>, handle: Arc<WaiterHandle>) -> Self {
        Self {
            coordinator,
            handle,
        }
    }

    /// Acceptance loop. Ends when the shift stops or the inbox closes.
    pub async fn run_acceptance(self, mut inbox: mpsc::Receiver<OrderId>) {
        let name = self.handle.name.clone();
        info!(waiter = %name, "Waiter accepting orders");
        while self.handle.is_working() {
            match self.accept_next(&mut inbox).await {
                Ok(()) => {}
                Err(ShiftError::Stopped) => break,
                Err(e) => warn!(waiter = %name, error = %e, "Acceptance failed"),
            }
        }
        info!(waiter = %name, accepted = self.handle.accepted(), "Waiter stopped accepting");
    }

    async fn accept_next(&self, inbox: &mut mpsc::Receiver<OrderId>) -> Result<(), ShiftError> {
        let name = &self.handle.name;
        let config = &self.coordinator.config().waiter;
        let shift = self.coordinator.shift();

        shift.check_pause().await?;
        let id = tokio::select! {
            id = inbox.recv() => id.ok_or(ShiftError::Stopped)?,
            _ = shift.stopped() => return Err(ShiftError::Stopped),
        };

        if !self.wait_for_capacity(config).await? {
            self.coordinator.abandon_order(id, name);
            return Ok(());
        }

        shift.sleep(config.acceptance_delay()).await?;
        shift.check_pause().await?;

        self.handle.begin_order();
        if let Err(e) = self.coordinator.accept_order(id, name).await {
            self.handle.release_order();
            return Err(e);
        }

        match self.coordinator.add_to_kitchen_queue(id, name).await {
            Ok(()) => {}
            Err(e) => {
                self.handle.release_order();
                if e == ShiftError::Stopped {
                    return Err(e);
                }
                self.coordinator.drop_order(id, name, &e);
            }
        }
        self.coordinator
            .emit(RestaurantEvent::WaiterStatsChanged(self.handle.stats()));
        Ok(())
    }

    /// Busy-waits for a free slot. `Ok(false)` once the retries run out, or at once when
    /// the lifetime cap is reached since no slot will ever free up.
    async fn wait_for_capacity(&self, config: &WaiterConfig) -> Result<bool, ShiftError> {
        let shift = self.coordinator.shift();
        let mut retries = retry_budget(config.busy_retry(), config.busy_timeout());
        loop {
            if self.handle.at_lifetime_cap() {
                return Ok(false);
            }
            if self.handle.can_take_more() {
                return Ok(true);
            }
            if retries == 0 {
                return Ok(false);
            }
            retries -= 1;
            shift.sleep(config.busy_retry()).await?;
            shift.check_pause().await?;
        }
    }

    /// Delivery loop. Polls faster when the waiter has room for more orders.
    pub async fn run_delivery(self) {
        let name = self.handle.name.clone();
        let config = self.coordinator.config().waiter.clone();
        while self.handle.is_working() {
            match self.deliver_next(&config).await {
                Ok(_) => {}
                Err(ShiftError::Stopped) => break,
                Err(e) => warn!(waiter = %name, error = %e, "Delivery failed"),
            }
            let poll = if self.handle.at_concurrency_cap() {
                config.delivery_busy_poll()
            } else {
                config.delivery_poll()
            };
            if self.coordinator.shift().sleep(poll).await.is_err() {
                break;
            }
        }
        info!(waiter = %name, served = self.handle.served(), "Waiter stopped delivering");
    }

    async fn deliver_next(&self, config: &WaiterConfig) -> Result<bool, ShiftError> {
        let name = &self.handle.name;
        let shift = self.coordinator.shift();
        shift.check_pause().await?;

        let Some(order) = self.coordinator.take_ready_order(name).await? else {
            return Ok(false);
        };
        debug!(waiter = %name, order = %order.id, "Carrying order");

        let step = config.delivery_time(order.prep_time()) / config.delivery_steps;
        for _ in 0..config.delivery_steps {
            shift.sleep(step).await?;
            shift.check_pause().await?;
        }

        self.coordinator.deliver_order(order.id, name).await?;
        self.handle.finish_delivery();
        self.coordinator
            .emit(RestaurantEvent::WaiterStatsChanged(self.handle.stats()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::signal;

    fn config(queue_capacity: usize, lifetime_cap: u32) -> WaiterConfig {
        WaiterConfig {
            queue_capacity,
            lifetime_cap,
            ..WaiterConfig::default()
        }
    }

    #[test]
    fn test_retry_budget_counts_whole_retries() {
        let ms = Duration::from_millis;
        assert_eq!(retry_budget(ms(500), ms(3000)), 6);
        assert_eq!(retry_budget(ms(700), ms(3000)), 4);
        assert_eq!(retry_budget(ms(500), ms(100)), 0);
        assert_eq!(retry_budget(Duration::ZERO, ms(3)), 3);
    }

    #[test]
    fn test_lifetime_cap_closes_the_waiter() {
        let (handle, _inbox) = WaiterHandle::new("Waiter-1", &config(10, 2));
        assert!(handle.can_take_more());
        handle.begin_order();
        handle.release_order();
        handle.begin_order();
        handle.release_order();
        assert_eq!(handle.current_orders(), 0);
        assert!(handle.at_lifetime_cap());
        assert!(!handle.can_take_more());
    }

    /// A full inbox keeps the order waiting through a pause; only retry sleeps count.
    #[tokio::test(start_paused = true)]
    async fn test_offer_budget_ignores_paused_time() {
        let (control, shift) = signal::channel();
        let (handle, mut inbox) = WaiterHandle::new("Waiter-1", &config(1, 50));
        let handle = Arc::new(handle);
        assert!(handle
            .offer(OrderId(1), &shift, Duration::from_millis(500), Duration::from_secs(3))
            .await
            .unwrap());

        let offering = {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .offer(OrderId(2), &shift, Duration::from_millis(500), Duration::from_secs(3))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(700)).await;
        control.pause();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!offering.is_finished());

        control.resume();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(inbox.recv().await, Some(OrderId(1)));
        assert_eq!(offering.await.unwrap(), Ok(true));
        assert_eq!(inbox.recv().await, Some(OrderId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_offer_gives_up_after_retries() {
        let (_control, shift) = signal::channel();
        let (handle, _inbox) = WaiterHandle::new("Waiter-1", &config(1, 50));
        let retry = Duration::from_millis(500);
        let timeout = Duration::from_secs(3);
        assert!(handle.offer(OrderId(1), &shift, retry, timeout).await.unwrap());

        let started = tokio::time::Instant::now();
        assert!(!handle.offer(OrderId(2), &shift, retry, timeout).await.unwrap());
        assert_eq!(started.elapsed(), timeout);
    }
}
