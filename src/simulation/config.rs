//! Runway rules and timing.
//!
//! Every duration except the controller poll period is expressed in time
//! units; `time_unit_ms` maps a unit to wall-clock time so the same rules can
//! run at real speed (one unit per second) or compressed for tests.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Unreadable { path: String, source: std::io::Error },

    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunwayConfig {
    /// Aircraft allowed on the runway at the same time
    pub capacity: usize,
    /// Admissions the controller handles before taking a break
    pub break_limit: usize,
    /// Consecutive admissions in one direction before opposite demand wins
    pub direction_limit: usize,
    /// Consecutive admissions of one regular class before the other class is favoured
    pub fairness_run_limit: usize,
    /// Largest accepted workload
    pub max_aircraft: usize,
    /// Lower bound of the fuel reserve, in time units
    pub fuel_min: u64,
    /// Upper bound of the fuel reserve, in time units
    pub fuel_max: u64,
    pub break_duration: u64,
    pub switch_duration: u64,
    /// Longest an aircraft sleeps before re-evaluating admission
    pub wait_timeout: u64,
    pub time_unit_ms: u64,
    pub controller_poll_ms: u64,
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            break_limit: 8,
            direction_limit: 3,
            fairness_run_limit: 4,
            max_aircraft: 1000,
            fuel_min: 20,
            fuel_max: 60,
            break_duration: 5,
            switch_duration: 5,
            wait_timeout: 1,
            time_unit_ms: 1000,
            controller_poll_ms: 100,
        }
    }
}

impl RunwayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Unreadable { path: path.display().to_string(), source })?;
        let config: RunwayConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("capacity", self.capacity as u64),
            ("break_limit", self.break_limit as u64),
            ("direction_limit", self.direction_limit as u64),
            ("fairness_run_limit", self.fairness_run_limit as u64),
            ("max_aircraft", self.max_aircraft as u64),
            ("wait_timeout", self.wait_timeout),
            ("time_unit_ms", self.time_unit_ms),
            ("controller_poll_ms", self.controller_poll_ms),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        if self.fuel_min > self.fuel_max {
            return Err(ConfigError::Invalid(format!(
                "fuel_min ({}) exceeds fuel_max ({})", self.fuel_min, self.fuel_max)));
        }
        Ok(())
    }

    pub fn units(&self, units: u64) -> Duration {
        Duration::from_millis(units.saturating_mul(self.time_unit_ms))
    }

    pub fn break_time(&self) -> Duration {
        self.units(self.break_duration)
    }

    pub fn switch_time(&self) -> Duration {
        self.units(self.switch_duration)
    }

    pub fn wait_time(&self) -> Duration {
        self.units(self.wait_timeout)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.controller_poll_ms)
    }
}
