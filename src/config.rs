//! Configuration management

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::defaults;
use crate::services::scheduler;
use crate::types::{GeoLocation, UserPreferences};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string; appointments go to a JSON file when unset
    pub database_url: Option<String>,

    /// JSON appointment file used without a database
    pub appointments_file: PathBuf,

    /// "district" or "nominatim"
    pub geocoder_backend: String,

    /// Nominatim API URL (for geocoding)
    pub nominatim_url: String,

    /// Optional `countrycodes` filter for Nominatim searches
    pub nominatim_country_codes: Option<String>,

    /// Working hours, slot length and home base
    pub preferences: UserPreferences,

    /// Default search horizon in days
    pub days_to_check: u32,

    /// Maximum number of unpolled inbound tasks
    pub task_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let appointments_file = std::env::var("APPOINTMENTS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("appointments.json"));

        let geocoder_backend = std::env::var("GEOCODER_BACKEND")
            .unwrap_or_else(|_| "district".to_string());

        let nominatim_url = std::env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let nominatim_country_codes = std::env::var("NOMINATIM_COUNTRY_CODES").ok();

        let home = defaults::default_home_base();
        let preferences = UserPreferences {
            work_start_hour: env_or("WORK_START_HOUR", defaults::DEFAULT_WORK_START_HOUR)?,
            work_end_hour: env_or("WORK_END_HOUR", defaults::DEFAULT_WORK_END_HOUR)?,
            appointment_duration_minutes: env_or(
                "APPOINTMENT_DURATION_MINUTES",
                defaults::DEFAULT_APPOINTMENT_DURATION_MINUTES,
            )?,
            home_base: GeoLocation {
                lat: env_or("HOME_BASE_LAT", home.lat)?,
                lng: env_or("HOME_BASE_LNG", home.lng)?,
                address: std::env::var("HOME_BASE_ADDRESS").unwrap_or(home.address),
            },
        };
        preferences
            .validate()
            .context("Working-hour configuration is invalid")?;

        let days_to_check = env_or("DAYS_TO_CHECK", defaults::DEFAULT_DAYS_TO_CHECK)?;
        scheduler::check_horizon(days_to_check).context("DAYS_TO_CHECK is out of range")?;
        let task_queue_capacity = env_or("TASK_QUEUE_CAPACITY", defaults::DEFAULT_TASK_QUEUE_CAPACITY)?;

        if task_queue_capacity == 0 {
            anyhow::bail!("TASK_QUEUE_CAPACITY must be at least 1");
        }

        Ok(Self {
            nats_url,
            database_url,
            appointments_file,
            geocoder_backend,
            nominatim_url,
            nominatim_country_codes,
            preferences,
            days_to_check,
            task_queue_capacity,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
            database_url: None,
            appointments_file: std::env::temp_dir().join("serviceroute-test-appointments.json"),
            geocoder_backend: "district".to_string(),
            nominatim_url: "http://localhost:8080".to_string(),
            nominatim_country_codes: None,
            preferences: UserPreferences::default(),
            days_to_check: defaults::DEFAULT_DAYS_TO_CHECK,
            task_queue_capacity: defaults::DEFAULT_TASK_QUEUE_CAPACITY,
        }
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
