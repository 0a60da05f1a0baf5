//! services/notifier/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reminder_core::{Horizon, Platform};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("No snapshot file at {}", .0.display())]
    MissingSnapshot(PathBuf),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub log_level: Level,
    pub platform: Platform,
    pub horizon: Horizon,
    pub debounce: Duration,
    pub safety_margin: Duration,
    pub poll_interval: Duration,
    pub refresh_interval: Duration,
    pub queue_capacity: usize,
    pub notifications_permitted: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./reminders.json"));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Horizon: platform defaults, each field overridable ---
        let platform = match lookup("PLATFORM")
            .unwrap_or_else(|| "android".to_string())
            .to_lowercase()
            .as_str()
        {
            "ios" => Platform::Ios,
            "android" => Platform::Android,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PLATFORM".to_string(),
                    format!("'{}' is not one of ios, android", other),
                ))
            }
        };
        let defaults = Horizon::for_platform(platform);
        let horizon = Horizon {
            days: parse_or(&lookup, "DAILY_HORIZON_DAYS", defaults.days)?,
            weeks: parse_or(&lookup, "WEEKLY_HORIZON_WEEKS", defaults.weeks)?,
        };

        // --- Timing ---
        let debounce = Duration::from_millis(parse_or(&lookup, "DEBOUNCE_MS", 750)?);
        let safety_margin = Duration::from_secs(parse_or(&lookup, "SAFETY_MARGIN_SECS", 5)?);
        let poll_interval = Duration::from_secs(parse_or(&lookup, "POLL_INTERVAL_SECS", 2)?);
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let refresh_hours: u64 = parse_or(&lookup, "REFRESH_HOURS", 24)?;
        if refresh_hours == 0 {
            return Err(ConfigError::InvalidValue(
                "REFRESH_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let refresh_interval = refresh_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REFRESH_HOURS".to_string(),
                    format!("{} hours is too long", refresh_hours),
                )
            })?;

        // --- Local queue ---
        let queue_capacity = parse_or(&lookup, "QUEUE_CAPACITY", 64)?;
        let notifications_permitted = parse_or(&lookup, "NOTIFICATIONS_PERMITTED", true)?;

        Ok(Self {
            snapshot_path,
            log_level,
            platform,
            horizon,
            debounce,
            safety_margin,
            poll_interval,
            refresh_interval,
            queue_capacity,
            notifications_permitted,
        })
    }

    /// Same as `from_env`, but fails if the snapshot file does not exist.
    pub fn from_env_requiring_snapshot() -> Result<Self, ConfigError> {
        let config = Self::from_env()?;
        if !config.snapshot_path.exists() {
            return Err(ConfigError::MissingSnapshot(config.snapshot_path));
        }
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}
