//! Global configuration.
//!
//! Optional `config.json` with the OTP endpoint, polling interval, night
//! pause window, and stop-query TTL. Defaults are used when the file is
//! absent; a file that exists but does not parse is a startup error.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default base URL for the Muoversi a Torino OpenTripPlanner instance.
pub const DEFAULT_OTP_URL: &str = "https://plan.muoversiatorino.it/otp/routers/mato/index";

/// Errors loading the global configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Hour window during which fetching and message edits are suspended.
///
/// The window is `[start_hour, end_hour)` in Europe/Rome wall-clock hours
/// and may cross midnight. `start_hour == end_hour` means no pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightPause {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl NightPause {
    /// True if the given wall-clock hour falls inside the pause window.
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            self.start_hour <= hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Global settings shared by every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base endpoint of the arrival data provider.
    #[serde(default = "default_otp_url")]
    pub otp_base_url: String,

    /// Seconds between update cycles.
    #[serde(default = "default_interval")]
    pub polling_interval_seconds: u64,

    /// Night pause window; `null` disables it.
    #[serde(default = "default_night_pause")]
    pub night_pause: Option<NightPause>,

    /// Minutes a stop query stays live.
    #[serde(default = "default_ttl")]
    pub stop_ttl_minutes: i64,

    /// Deadline for the per-cycle provider fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

fn default_otp_url() -> String {
    DEFAULT_OTP_URL.to_string()
}

fn default_interval() -> u64 {
    15
}

fn default_night_pause() -> Option<NightPause> {
    Some(NightPause {
        start_hour: 2,
        end_hour: 7,
    })
}

fn default_ttl() -> i64 {
    15
}

fn default_fetch_timeout() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Config {
            otp_base_url: default_otp_url(),
            polling_interval_seconds: default_interval(),
            night_pause: default_night_pause(),
            stop_ttl_minutes: default_ttl(),
            fetch_timeout_seconds: default_fetch_timeout(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
