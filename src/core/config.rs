//! Engine configuration
//!
//! Everything the tick driver needs to know about pacing and fault handling
//! lives here. Values can be loaded from TOML; any field left out keeps its
//! default.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{EngineError, Result};
use crate::core::types::SimTime;

/// What the tick driver does when a behavior hook returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop the tick and hand the error to the caller
    #[default]
    AbortTick,
    /// Log the error, skip the faulting entity, and keep going
    SkipEntity,
}

/// Configuration for the engine and its tick driver
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    // === CLOCK ===
    /// Simulated seconds that pass per tick
    ///
    /// Telegram delays are expressed in the same unit, so a delay of
    /// `2 * time_step` arrives two ticks after it was sent.
    pub time_step: SimTime,

    /// Simulated time of the first tick
    pub start_time: SimTime,

    /// Upper bound on ticks for drivers that run unattended
    pub max_ticks: u64,

    // === FAULTS ===
    /// How errors raised by behavior code are handled during a tick
    pub fault_policy: FaultPolicy,

    // === REGISTRY ===
    /// Reject worlds whose entities share a name
    ///
    /// Name lookups return the first registered match, so duplicate names are
    /// usually a setup mistake.
    pub require_unique_names: bool,

    // === LOGGING ===
    /// Default tracing filter directive, used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0,
            start_time: 0.0,
            max_ticks: 100,
            fault_policy: FaultPolicy::AbortTick,
            require_unique_names: true,
            log_filter: "behavior_engine=info".into(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(format!("time_step ({}) must be positive", self.time_step));
        }

        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(format!(
                "start_time ({}) must be finite and non-negative",
                self.start_time
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err("log_filter must not be empty".into());
        }

        Ok(())
    }
}
