//! # Load Scheduler
//!
//! Two tasks per shift: the generator, which places a random order after a delay drawn
//! from the current [`LoadMode`] band, and the timeline, which escalates the mode as
//! unpaused shift time accumulates on the [`ActiveClock`]. Both end when the shift stops.

use crate::config::{DelayBand, LoadConfig};
use crate::lifecycle::{Coordinator, RestaurantError, ShiftError};
use crate::model::{random_client, DishCategory, OrderCreate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadMode {
    Normal,
    High,
    Peak,
}

impl LoadMode {
    /// Mode for a given amount of unpaused shift time.
    pub fn for_active_time(active: Duration, config: &LoadConfig) -> LoadMode {
        if active >= Duration::from_secs(config.peak_after_secs) {
            LoadMode::Peak
        } else if active >= Duration::from_secs(config.high_after_secs) {
            LoadMode::High
        } else {
            LoadMode::Normal
        }
    }

    pub fn band(self, config: &LoadConfig) -> DelayBand {
        match self {
            LoadMode::Normal => config.normal,
            LoadMode::High => config.high,
            LoadMode::Peak => config.peak,
        }
    }

    /// Delay before the next generated order.
    pub fn next_delay(self, config: &LoadConfig, rng: &mut impl Rng) -> Duration {
        let band = self.band(config);
        Duration::from_millis(rng.gen_range(band.min_ms..=band.max_ms))
    }
}

impl Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoadMode::Normal => "normal",
            LoadMode::High => "high",
            LoadMode::Peak => "peak",
        };
        f.write_str(label)
    }
}

/// Stopwatch that only runs while the shift is unpaused.
#[derive(Debug, Clone)]
pub struct ActiveClock {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl ActiveClock {
    pub fn started() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: Some(Instant::now()),
        }
    }

    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.running_since.map(|s| s.elapsed()).unwrap_or_default()
    }
}

pub struct LoadScheduler {
    clock: Arc<Mutex<ActiveClock>>,
    tasks: Vec<JoinHandle<()>>,
}

impl LoadScheduler {
    /// Starts the clock and spawns the generator and timeline tasks.
    pub fn start(coordinator: Arc<Coordinator>) -> Self {
        let clock = Arc::new(Mutex::new(ActiveClock::started()));
        let tasks = vec![
            tokio::spawn(generate_orders(coordinator.clone())),
            tokio::spawn(escalate_load(coordinator, clock.clone())),
        ];
        Self { clock, tasks }
    }

    /// Freezes the clock. The generator parks at its pause checkpoint on its own, so an
    /// order it is placing or offering finishes normally.
    pub fn suspend(&mut self) {
        self.clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pause();
        debug!("Scheduler suspended");
    }

    pub fn resume(&mut self) {
        self.clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .resume();
        debug!("Scheduler resumed");
    }

    /// Hands over the task handles so the caller can join them once the shift is stopped.
    pub fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.tasks)
    }
}

impl Drop for LoadScheduler {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn generate_orders(coordinator: Arc<Coordinator>) {
    let mut rng = StdRng::from_entropy();
    let config = coordinator.config().load.clone();
    loop {
        if coordinator.shift().sleep(config.tick()).await.is_err() {
            break;
        }
        if coordinator.remaining_orders() == 0 {
            coordinator.notify_limit_reached();
            break;
        }

        let delay = coordinator.load_mode().next_delay(&config, &mut rng);
        if coordinator.shift().sleep(delay).await.is_err() {
            break;
        }
        if coordinator.check_pause().await.is_err() {
            break;
        }

        let category = DishCategory::random(&mut rng);
        let order = OrderCreate {
            client_name: random_client(&mut rng).to_string(),
            dish_name: category.random_dish(&mut rng).to_string(),
            category,
        };
        match coordinator.place_order(order).await {
            Ok(id) => {
                if let Err(ShiftError::Stopped) = coordinator.assign_order_to_waiter(id).await {
                    break;
                }
            }
            Err(RestaurantError::OrderLimitReached { .. }) => {
                coordinator.notify_limit_reached();
                break;
            }
            Err(e) => warn!(error = %e, "Failed to generate order"),
        }
        if coordinator.remaining_orders() == 0 {
            coordinator.notify_limit_reached();
            break;
        }
    }
    debug!("Order generation finished");
}

async fn escalate_load(coordinator: Arc<Coordinator>, clock: Arc<Mutex<ActiveClock>>) {
    let config = coordinator.config().load.clone();
    loop {
        let active = clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .elapsed();
        let mode = LoadMode::for_active_time(active, &config);
        if mode > coordinator.load_mode() {
            info!(%mode, active_secs = active.as_secs(), "Escalating load");
            coordinator.set_load_mode(mode);
        }
        if mode == LoadMode::Peak {
            break;
        }
        if coordinator.shift().sleep(config.tick()).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_escalates_on_timeline() {
        let config = LoadConfig::default();
        assert_eq!(LoadMode::for_active_time(Duration::ZERO, &config), LoadMode::Normal);
        assert_eq!(
            LoadMode::for_active_time(Duration::from_secs(59), &config),
            LoadMode::Normal
        );
        assert_eq!(
            LoadMode::for_active_time(Duration::from_secs(60), &config),
            LoadMode::High
        );
        assert_eq!(
            LoadMode::for_active_time(Duration::from_secs(120), &config),
            LoadMode::Peak
        );
    }

    #[test]
    fn test_delays_stay_inside_band() {
        let config = LoadConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for mode in [LoadMode::Normal, LoadMode::High, LoadMode::Peak] {
            let band = mode.band(&config);
            for _ in 0..50 {
                let delay = mode.next_delay(&config, &mut rng).as_millis() as u64;
                assert!(delay >= band.min_ms && delay <= band.max_ms);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_clock_skips_paused_time() {
        let mut clock = ActiveClock::started();
        tokio::time::advance(Duration::from_secs(10)).await;
        clock.pause();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(clock.elapsed(), Duration::from_secs(10));
        clock.resume();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.elapsed(), Duration::from_secs(15));
    }
}
