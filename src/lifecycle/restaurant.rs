//! # Restaurant
//!
//! The public entry point. A [`Restaurant`] lives across shifts; each `start()` builds a
//! fresh shift (order registry actor, coordinator, workers, scheduler) and `stop()` tears
//! it down again, leaving only the history behind.
//!
//! ## Startup Order
//!
//! 1. Shift signal (`Running`)
//! 2. Order registry actor, started with the signal as its context
//! 3. Waiter and cook handles, then the coordinator that owns them
//! 4. Cook tasks, waiter acceptance and delivery tasks
//! 5. Load scheduler
//!
//! ## Shutdown
//!
//! `stop()` signals `Stopped` and gives the scheduler, cooks and waiters a grace period
//! before aborting them. The summary is taken before anything is cleared, and the
//! teardown runs to the end even when the order registry no longer answers.

use super::coordinator::Coordinator;
use super::error::RestaurantError;
use super::signal::{self, ShiftControl, ShiftState};
use super::stats::{CookStats, ShiftStats, WaiterStats};
use crate::config::SimConfig;
use crate::history::{HistoryStore, ShiftSummary};
use crate::model::{DishCategory, Order, OrderCreate, OrderId};
use crate::observer::{Observer, RestaurantEvent};
use crate::order_actor::{self, OrderContext};
use crate::workers::{CookHandle, CookWorker, LoadScheduler, WaiterHandle, WaiterWorker};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

struct Shift {
    control: ShiftControl,
    coordinator: Arc<Coordinator>,
    scheduler: LoadScheduler,
    cooks: Vec<JoinHandle<()>>,
    waiters: Vec<JoinHandle<()>>,
    registry: JoinHandle<()>,
    started_at: DateTime<Local>,
    started: Instant,
}

pub struct Restaurant {
    config: SimConfig,
    history: Arc<dyn HistoryStore>,
    observer: Arc<dyn Observer>,
    shift: Mutex<Option<Shift>>,
}

impl Restaurant {
    pub fn new(
        config: SimConfig,
        history: Arc<dyn HistoryStore>,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, RestaurantError> {
        config.validate()?;
        Ok(Self {
            config,
            history,
            observer,
            shift: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Opens a shift with the given staff.
    pub async fn start(&self, waiter_count: usize, cook_count: usize) -> Result<(), RestaurantError> {
        let mut slot = self.shift.lock().await;
        if slot.is_some() {
            warn!("Start requested while a shift is running");
            return Err(RestaurantError::AlreadyRunning);
        }

        let (control, shift_signal) = signal::channel();

        let (registry_actor, orders) = order_actor::new();
        let registry = tokio::spawn(registry_actor.run(OrderContext::new(shift_signal.clone())));

        let mut waiter_handles = Vec::with_capacity(waiter_count);
        let mut inboxes = Vec::with_capacity(waiter_count);
        for n in 1..=waiter_count {
            let (handle, inbox) = WaiterHandle::new(format!("Waiter-{}", n), &self.config.waiter);
            waiter_handles.push(Arc::new(handle));
            inboxes.push(inbox);
        }
        let cook_handles: Vec<Arc<CookHandle>> = (1..=cook_count)
            .map(|n| Arc::new(CookHandle::new(format!("Cook-{}", n))))
            .collect();

        let coordinator = Arc::new(Coordinator::new(
            self.config.clone(),
            shift_signal,
            orders,
            self.observer.clone(),
            waiter_handles.clone(),
            cook_handles.clone(),
        ));

        let cooks = cook_handles
            .into_iter()
            .map(|handle| tokio::spawn(CookWorker::new(coordinator.clone(), handle).run()))
            .collect();

        let mut waiters = Vec::with_capacity(waiter_count * 2);
        for (handle, inbox) in waiter_handles.into_iter().zip(inboxes) {
            let worker = WaiterWorker::new(coordinator.clone(), handle);
            waiters.push(tokio::spawn(worker.clone().run_acceptance(inbox)));
            waiters.push(tokio::spawn(worker.run_delivery()));
        }

        let scheduler = LoadScheduler::start(coordinator.clone());

        info!(waiters = waiter_count, cooks = cook_count, "Shift started");
        self.observer.notify(&RestaurantEvent::ShiftStarted {
            waiters: waiter_count,
            cooks: cook_count,
        });

        *slot = Some(Shift {
            control,
            coordinator,
            scheduler,
            cooks,
            waiters,
            registry,
            started_at: Local::now(),
            started: Instant::now(),
        });
        Ok(())
    }

    /// Toggles the pause state. Returns `true` if the shift is paused afterwards.
    pub async fn pause(&self) -> Result<bool, RestaurantError> {
        let mut slot = self.shift.lock().await;
        let shift = slot.as_mut().ok_or(RestaurantError::NotRunning)?;

        if shift.control.pause() {
            shift.scheduler.suspend();
            shift.coordinator.set_workers_paused(true);
            info!("Shift paused");
            self.observer
                .notify(&RestaurantEvent::PauseChanged { paused: true });
            Ok(true)
        } else {
            Self::resume_shift(shift, self.observer.as_ref());
            Ok(false)
        }
    }

    /// Resumes a paused shift. A running shift is left as it is.
    pub async fn resume(&self) -> Result<(), RestaurantError> {
        let mut slot = self.shift.lock().await;
        let shift = slot.as_mut().ok_or(RestaurantError::NotRunning)?;
        Self::resume_shift(shift, self.observer.as_ref());
        Ok(())
    }

    fn resume_shift(shift: &mut Shift, observer: &dyn Observer) {
        if shift.control.resume() {
            shift.coordinator.set_workers_paused(false);
            shift.scheduler.resume();
            info!("Shift resumed");
            observer.notify(&RestaurantEvent::PauseChanged { paused: false });
        }
    }

    /// Ends the shift and records its summary in the history.
    pub async fn stop(&self) -> Result<ShiftSummary, RestaurantError> {
        let mut shift = self
            .shift
            .lock()
            .await
            .take()
            .ok_or(RestaurantError::NotRunning)?;
        info!("Stopping shift");

        shift.coordinator.stop_workers();
        shift.control.stop();

        let shutdown = &self.config.shutdown;
        join_or_abort(shift.scheduler.take_tasks(), shutdown.waiter_grace(), "scheduler").await;
        join_or_abort(shift.cooks, shutdown.cook_grace(), "cook").await;
        join_or_abort(shift.waiters, shutdown.waiter_grace(), "waiter").await;

        let summary = shift
            .coordinator
            .summary(shift.started_at, shift.started.elapsed())
            .await;

        if let Err(e) = shift.coordinator.drain().await {
            warn!(error = %e, "Failed to clear the order registry");
        }
        shift.registry.abort();

        self.history.append(summary.to_string());
        info!(
            total = summary.total_orders,
            delivered = summary.delivered,
            "Shift ended"
        );
        self.observer.notify(&RestaurantEvent::ShiftEnded {
            total_orders: summary.total_orders,
            delivered: summary.delivered,
        });
        Ok(summary)
    }

    /// Places an order by hand. Refused when no shift runs, while paused, or at the cap.
    pub async fn submit_order(
        &self,
        client_name: &str,
        dish_name: &str,
        category: DishCategory,
    ) -> Result<OrderId, RestaurantError> {
        let coordinator = match self.active_coordinator().await {
            Ok(coordinator) => coordinator,
            Err(e) => {
                self.reject(client_name, &e);
                return Err(e);
            }
        };

        let order = OrderCreate {
            client_name: client_name.to_string(),
            dish_name: dish_name.to_string(),
            category,
        };
        let id = match coordinator.place_order(order).await {
            Ok(id) => id,
            Err(e) => {
                self.reject(client_name, &e);
                return Err(e);
            }
        };
        if let Err(e) = coordinator.assign_order_to_waiter(id).await {
            warn!(order = %id, error = %e, "Manual order not assigned");
        }
        Ok(id)
    }

    fn reject(&self, client_name: &str, error: &RestaurantError) {
        warn!(client = %client_name, error = %error, "Manual order rejected");
        self.observer.notify(&RestaurantEvent::OrderRejected {
            client: client_name.to_string(),
            reason: error.to_string(),
        });
    }

    async fn active_coordinator(&self) -> Result<Arc<Coordinator>, RestaurantError> {
        let slot = self.shift.lock().await;
        let shift = slot.as_ref().ok_or(RestaurantError::NotRunning)?;
        match shift.control.state() {
            ShiftState::Running => Ok(shift.coordinator.clone()),
            ShiftState::Paused => Err(RestaurantError::Paused),
            ShiftState::Stopped => Err(RestaurantError::NotRunning),
        }
    }

    async fn coordinator(&self) -> Option<Arc<Coordinator>> {
        self.shift
            .lock()
            .await
            .as_ref()
            .map(|shift| shift.coordinator.clone())
    }

    pub async fn is_running(&self) -> bool {
        self.shift.lock().await.is_some()
    }

    pub async fn is_paused(&self) -> bool {
        self.shift
            .lock()
            .await
            .as_ref()
            .map(|shift| shift.control.state() == ShiftState::Paused)
            .unwrap_or(false)
    }

    pub async fn stats(&self) -> Result<ShiftStats, RestaurantError> {
        let coordinator = self.coordinator().await.ok_or(RestaurantError::NotRunning)?;
        let stats = coordinator
            .stats()
            .await?;
        self.observer
            .notify(&RestaurantEvent::ShiftStatsChanged(stats.clone()));
        Ok(stats)
    }

    /// Empty when no shift is running.
    pub async fn waiter_stats(&self) -> Vec<WaiterStats> {
        match self.coordinator().await {
            Some(coordinator) => coordinator.waiter_stats(),
            None => Vec::new(),
        }
    }

    /// Empty when no shift is running.
    pub async fn cook_stats(&self) -> Vec<CookStats> {
        match self.coordinator().await {
            Some(coordinator) => coordinator.cook_stats(),
            None => Vec::new(),
        }
    }

    /// Orders still in the registry, in id order.
    pub async fn orders(&self) -> Result<Vec<Order>, RestaurantError> {
        let coordinator = self.coordinator().await.ok_or(RestaurantError::NotRunning)?;
        Ok(coordinator.orders().await?)
    }

    /// Orders no waiter could take, parked for the rest of the shift.
    pub async fn unassigned_orders(&self) -> Vec<OrderId> {
        match self.coordinator().await {
            Some(coordinator) => coordinator.unassigned_orders(),
            None => Vec::new(),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read_all()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }
}

/// Waits for every task up to a shared deadline, then aborts the rest.
async fn join_or_abort(tasks: Vec<JoinHandle<()>>, grace: std::time::Duration, role: &str) {
    let deadline = Instant::now() + grace;
    for mut task in tasks {
        if tokio::time::timeout_at(deadline, &mut task).await.is_err() {
            warn!(role, "Worker did not stop in time, aborting");
            task.abort();
        }
    }
}
