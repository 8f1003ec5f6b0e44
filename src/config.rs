//! Simulation configuration, loadable from a TOML file.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! [staff]
//! waiters = 4
//!
//! [kitchen]
//! capacity = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub staff: StaffConfig,
    pub kitchen: KitchenConfig,
    pub waiter: WaiterConfig,
    pub load: LoadConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffConfig {
    pub waiters: usize,
    pub cooks: usize,
}

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            waiters: 3,
            cooks: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Bound of the kitchen queue.
    pub capacity: usize,
    /// Orders accepted per shift, generated and manual together.
    pub max_total_orders: u32,
    pub enqueue_retry_ms: u64,
    pub enqueue_attempts: u32,
    pub cook_steps: u32,
    pub cook_error_cooldown_ms: u64,
    /// Run the stale-order sweep every this many deliveries.
    pub eviction_every: u64,
    pub eviction_age_secs: u64,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            max_total_orders: 100,
            enqueue_retry_ms: 1000,
            enqueue_attempts: 5,
            cook_steps: 10,
            cook_error_cooldown_ms: 1000,
            eviction_every: 20,
            eviction_age_secs: 30,
        }
    }
}

impl KitchenConfig {
    pub fn enqueue_retry(&self) -> Duration {
        Duration::from_millis(self.enqueue_retry_ms)
    }

    pub fn cook_error_cooldown(&self) -> Duration {
        Duration::from_millis(self.cook_error_cooldown_ms)
    }

    pub fn eviction_age(&self) -> Duration {
        Duration::from_secs(self.eviction_age_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaiterConfig {
    /// Orders a waiter may carry at once.
    pub concurrency_cap: u32,
    /// Orders a waiter may accept over the whole shift.
    pub lifetime_cap: u32,
    pub queue_capacity: usize,
    pub acceptance_delay_ms: u64,
    pub busy_retry_ms: u64,
    pub busy_timeout_ms: u64,
    pub delivery_base_ms: u64,
    pub delivery_steps: u32,
    pub delivery_poll_ms: u64,
    pub delivery_busy_poll_ms: u64,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            concurrency_cap: 3,
            lifetime_cap: 50,
            queue_capacity: 10,
            acceptance_delay_ms: 800,
            busy_retry_ms: 500,
            busy_timeout_ms: 3000,
            delivery_base_ms: 500,
            delivery_steps: 5,
            delivery_poll_ms: 300,
            delivery_busy_poll_ms: 1000,
        }
    }
}

impl WaiterConfig {
    pub fn acceptance_delay(&self) -> Duration {
        Duration::from_millis(self.acceptance_delay_ms)
    }

    pub fn busy_retry(&self) -> Duration {
        Duration::from_millis(self.busy_retry_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Walking time for a dish: the base plus a tenth of its preparation time.
    pub fn delivery_time(&self, prep_time: Duration) -> Duration {
        Duration::from_millis(self.delivery_base_ms) + prep_time / 10
    }

    pub fn delivery_poll(&self) -> Duration {
        Duration::from_millis(self.delivery_poll_ms)
    }

    pub fn delivery_busy_poll(&self) -> Duration {
        Duration::from_millis(self.delivery_busy_poll_ms)
    }
}

/// Inclusive range of milliseconds between two generated orders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayBand {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayBand {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub tick_ms: u64,
    pub normal: DelayBand,
    pub high: DelayBand,
    pub peak: DelayBand,
    /// Unpaused shift time before `Normal` escalates to `High`.
    pub high_after_secs: u64,
    /// Unpaused shift time before `High` escalates to `Peak`.
    pub peak_after_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            normal: DelayBand::new(800, 1500),
            high: DelayBand::new(400, 800),
            peak: DelayBand::new(200, 400),
            high_after_secs: 60,
            peak_after_secs: 120,
        }
    }
}

impl LoadConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub cook_grace_ms: u64,
    pub waiter_grace_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            cook_grace_ms: 2000,
            waiter_grace_ms: 3000,
        }
    }
}

impl ShutdownConfig {
    pub fn cook_grace(&self) -> Duration {
        Duration::from_millis(self.cook_grace_ms)
    }

    pub fn waiter_grace(&self) -> Duration {
        Duration::from_millis(self.waiter_grace_ms)
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("kitchen.capacity", self.kitchen.capacity as u64),
            ("kitchen.enqueue_attempts", self.kitchen.enqueue_attempts as u64),
            ("kitchen.cook_steps", self.kitchen.cook_steps as u64),
            ("kitchen.eviction_every", self.kitchen.eviction_every),
            ("waiter.concurrency_cap", self.waiter.concurrency_cap as u64),
            ("waiter.queue_capacity", self.waiter.queue_capacity as u64),
            ("waiter.delivery_steps", self.waiter.delivery_steps as u64),
            ("load.tick_ms", self.load.tick_ms),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
        }

        for (name, band) in [
            ("load.normal", self.load.normal),
            ("load.high", self.load.high),
            ("load.peak", self.load.peak),
        ] {
            if band.min_ms > band.max_ms {
                return Err(ConfigError::Invalid(format!(
                    "{}: min_ms {} is above max_ms {}",
                    name, band.min_ms, band.max_ms
                )));
            }
        }

        if self.load.high_after_secs > self.load.peak_after_secs {
            return Err(ConfigError::Invalid(
                "load.high_after_secs must not exceed load.peak_after_secs".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
