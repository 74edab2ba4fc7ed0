//! Dashboard configuration.
//!
//! All structs deserialize from JSON with every field optional; missing
//! fields take the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::activity::DEFAULT_WINDOW_SIZE;
use crate::domain::notification::DEFAULT_NOTIFICATION_CAPACITY;
use crate::error::DashboardError;

/// Top-level configuration handed to [`ReliefStore::builder`](crate::ReliefStore::builder).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Load the demo requests, teams, and stock at startup.
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl DashboardConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DashboardError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DashboardError::validation("config", e.to_string()))?;
        config.simulation.validate()?;
        Ok(config)
    }
}

/// Event simulator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Tick period in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Chance per tick of synthesizing a request
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,

    /// Chance per tick of raising an urgent notification
    #[serde(default = "default_notify_probability")]
    pub notify_probability: f64,

    /// Activity samples kept for the live chart
    #[serde(default = "default_window_size")]
    pub rolling_window_size: usize,

    /// Notifications kept on the bell panel
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Fixed RNG seed; `None` draws from OS entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            spawn_probability: default_spawn_probability(),
            notify_probability: default_notify_probability(),
            rolling_window_size: default_window_size(),
            notification_capacity: default_notification_capacity(),
            random_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Returns the tick period as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Same config with a fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.tick_interval_ms == 0 {
            return Err(DashboardError::validation(
                "tickIntervalMs",
                "must be greater than zero",
            ));
        }
        for (field, p) in [
            ("spawnProbability", self.spawn_probability),
            ("notifyProbability", self.notify_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DashboardError::validation(
                    field,
                    format!("{p} is not a probability"),
                ));
            }
        }
        if self.rolling_window_size == 0 {
            return Err(DashboardError::validation(
                "rollingWindowSize",
                "must be at least 1",
            ));
        }
        if self.notification_capacity == 0 {
            return Err(DashboardError::validation(
                "notificationCapacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Display constants for the performance card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    #[serde(default = "default_average_response_time")]
    pub average_response_time: String,

    #[serde(default = "default_completion_rate")]
    pub completion_rate: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            average_response_time: default_average_response_time(),
            completion_rate: default_completion_rate(),
        }
    }
}

fn default_tick_interval() -> u64 {
    15_000 // 15 seconds
}

fn default_spawn_probability() -> f64 {
    0.15
}

fn default_notify_probability() -> f64 {
    0.10
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_notification_capacity() -> usize {
    DEFAULT_NOTIFICATION_CAPACITY
}

fn default_average_response_time() -> String {
    "12 mins".to_string()
}

fn default_completion_rate() -> String {
    "87%".to_string()
}
