//! Tunable constants of the simulation.
//!
//! Every field has a default matching the shipped game, so a config file only
//! needs the values it overrides:
//!
//! ```json
//! { "max_cps": 15, "offline_cap_secs": 3600.0 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Discrete simulation ticks per wall-clock second.
    pub ticks_per_sec: u32,
    /// Longest frame delta stepped tick by tick (ms). The rest of a longer gap
    /// is credited in one step.
    pub max_frame_ms: f64,

    /// Accepted clicks per click window.
    pub max_cps: u32,
    /// Length of the fixed click window (ms).
    pub click_window_ms: f64,

    /// Wall-clock time between autosaves (ms).
    pub autosave_interval_ms: f64,
    /// Absences shorter than this earn no offline progress (s).
    pub offline_min_secs: f64,
    /// Offline progress is credited for at most this long (s).
    pub offline_cap_secs: f64,

    /// Number of log entries kept (and persisted).
    pub log_capacity: usize,

    /// Base of the geometric damping applied above the ideas soft cap.
    pub scaling_multi: f64,
    /// Braindead cap per unit of brain size.
    pub base_braindead_cap: f64,
    /// Ideas soft cap per unit of brain size, before the immunity divisor.
    pub ideas_soft_base: f64,
    /// Ideas hard cap per unit of brain size, before the immunity divisor.
    pub ideas_hard_base: f64,

    /// Cooldown after working or stealing (s).
    pub job_cooldown_secs: f64,

    /// Key of the save blob in local storage.
    pub storage_key: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks_per_sec: 10,
            max_frame_ms: 500.0,
            max_cps: 10,
            click_window_ms: 1000.0,
            autosave_interval_ms: 30_000.0,
            offline_min_secs: 60.0,
            offline_cap_secs: 7200.0,
            log_capacity: 50,
            scaling_multi: 1.75,
            base_braindead_cap: 500.0,
            ideas_soft_base: 500.0,
            ideas_hard_base: 1000.0,
            job_cooldown_secs: 5.0,
            storage_key: "brainquest_save".into(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_sec == 0 {
            return Err(ConfigError::Invalid("ticks_per_sec must be positive".into()));
        }
        if self.scaling_multi <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "scaling_multi must be greater than 1 (got {})",
                self.scaling_multi
            )));
        }
        if self.ideas_soft_base > self.ideas_hard_base {
            return Err(ConfigError::Invalid(
                "ideas soft cap must not exceed the hard cap".into(),
            ));
        }
        if self.offline_cap_secs < self.offline_min_secs {
            return Err(ConfigError::Invalid(
                "offline_cap_secs must be at least offline_min_secs".into(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".into()));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::Invalid("log_capacity must be positive".into()));
        }
        Ok(())
    }
}
