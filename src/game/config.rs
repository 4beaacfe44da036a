//! Request Configuration
//!
//! Tunables for the request table. Defaults match a 256-slot host running
//! at 60 Hz with a ten second acceptance window.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::slot::MAX_PLAYERS;
use crate::{REQUEST_DURATION_TICKS, TICK_RATE};

/// Configuration for the request table and its update loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Number of host slots (table capacity).
    pub max_players: usize,
    /// Ticks a request stays pending before it expires.
    pub request_duration_ticks: u32,
    /// Host simulation rate (Hz).
    pub tick_rate: u32,
    /// Tell the target when an ignored request is auto-denied.
    pub notify_target_on_expiry: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            request_duration_ticks: REQUEST_DURATION_TICKS, // 10 seconds @ 60Hz
            tick_rate: TICK_RATE,
            notify_target_on_expiry: true,
        }
    }
}

impl RequestConfig {
    /// Create config from environment variables.
    ///
    /// Unset variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_players: env_parse("TPA_MAX_PLAYERS")?.unwrap_or(defaults.max_players),
            request_duration_ticks: env_parse("TPA_REQUEST_TICKS")?
                .unwrap_or(defaults.request_duration_ticks),
            tick_rate: env_parse("TPA_TICK_RATE")?.unwrap_or(defaults.tick_rate),
            notify_target_on_expiry: std::env::var("TPA_NOTIFY_TARGET_ON_EXPIRY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.notify_target_on_expiry),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a JSON document. Missing fields keep their default.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the table cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 || i32::try_from(self.max_players).is_err() {
            return Err(ConfigError::Invalid("max_players", self.max_players.to_string()));
        }
        if self.request_duration_ticks == 0 {
            return Err(ConfigError::Invalid("request_duration_ticks", "0".into()));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate", "0".into()));
        }
        Ok(())
    }

    /// Acceptance window in whole seconds, rounded up.
    pub fn request_duration_secs(&self) -> u32 {
        self.request_duration_ticks.div_ceil(self.tick_rate)
    }
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or unparsable.
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    /// Malformed JSON document.
    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
}
