use crate::error::{config_error, env_error, GarageResult};
use crate::schedule::time::parse_time;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;

/// Default opening time for days the backend has no data for
pub const DEFAULT_OPEN: &str = "09:00";
/// Default closing time for days the backend has no data for
pub const DEFAULT_CLOSE: &str = "17:00";
/// Default slot granularity in minutes
pub const DEFAULT_SLOT_DURATION: u32 = 60;

/// Main configuration structure for the client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the garage-dashboard API
    pub api_base_url: String,
    /// Bearer token attached to every request
    pub api_token: String,
    /// Opening time used when a day has no stored hours
    pub default_open: String,
    /// Closing time used when a day has no stored hours
    pub default_close: String,
    /// Slot duration (minutes) used when a day has no stored hours
    pub default_slot_duration: u32,
    /// Seconds between slot-watch poll attempts
    pub poll_interval_secs: u64,
    /// Maximum slot-watch poll attempts before giving up
    pub poll_max_attempts: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Optional overrides loaded from config/garagehours.toml
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    default_open: Option<String>,
    default_close: Option<String>,
    default_slot_duration: Option<u32>,
    poll_interval_secs: Option<u64>,
    poll_max_attempts: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> GarageResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let api_base_url =
            env::var("GARAGE_API_BASE_URL").map_err(|_| env_error("GARAGE_API_BASE_URL"))?;
        let api_token = env::var("GARAGE_API_TOKEN").map_err(|_| env_error("GARAGE_API_TOKEN"))?;

        let mut config = Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token,
            default_open: DEFAULT_OPEN.to_string(),
            default_close: DEFAULT_CLOSE.to_string(),
            default_slot_duration: DEFAULT_SLOT_DURATION,
            poll_interval_secs: 5,
            poll_max_attempts: 12,
            request_timeout_secs: 30,
        };

        // Load overrides from file if it exists
        if let Ok(content) = fs::read_to_string("config/garagehours.toml") {
            let overrides = toml::from_str::<FileOverrides>(&content)?;
            config.apply(overrides);
        }

        // Environment wins over the file
        if let Ok(open) = env::var("GARAGE_DEFAULT_OPEN") {
            config.default_open = open;
        }
        if let Ok(close) = env::var("GARAGE_DEFAULT_CLOSE") {
            config.default_close = close;
        }
        if let Ok(duration) = env::var("GARAGE_DEFAULT_SLOT_DURATION") {
            config.default_slot_duration = duration
                .parse::<u32>()
                .map_err(|_| config_error("Invalid GARAGE_DEFAULT_SLOT_DURATION format"))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, overrides: FileOverrides) {
        if let Some(open) = overrides.default_open {
            self.default_open = open;
        }
        if let Some(close) = overrides.default_close {
            self.default_close = close;
        }
        if let Some(duration) = overrides.default_slot_duration {
            self.default_slot_duration = duration;
        }
        if let Some(interval) = overrides.poll_interval_secs {
            self.poll_interval_secs = interval;
        }
        if let Some(attempts) = overrides.poll_max_attempts {
            self.poll_max_attempts = attempts;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
    }

    /// Check that the configured defaults are themselves usable
    fn validate(&self) -> GarageResult<()> {
        if parse_time(&self.default_open).is_none() {
            return Err(config_error("Default opening time is not a valid HH:MM time"));
        }
        if parse_time(&self.default_close).is_none() {
            return Err(config_error("Default closing time is not a valid HH:MM time"));
        }
        if self.default_open >= self.default_close {
            return Err(config_error(
                "Default opening time must be before default closing time",
            ));
        }
        if !(15..=480).contains(&self.default_slot_duration) {
            return Err(config_error(
                "Default slot duration must be between 15 and 480 minutes",
            ));
        }
        Ok(())
    }
}
