use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;
use thiserror::Error;

use crate::sensor::DEFAULT_SENSOR_INTERVAL;

pub const CONNECTION_STRING_ENV: &str = "AZURE_CONNECTION_STRING";

pub const DEFAULT_DATABASE_PATH: &str = "sensor_data.db";

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

/// Gateway settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection_string: String,

    pub database_path: PathBuf,

    pub timezone: Option<Tz>,

    pub sample_interval: Duration,

    pub sensor_interval: Duration,
}

impl Config {
    pub fn new(connection_string: Option<String>) -> Result<Self, ConfigError> {
        let connection_string = connection_string
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing(CONNECTION_STRING_ENV))?;

        Ok(Self {
            connection_string,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            timezone: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            sensor_interval: DEFAULT_SENSOR_INTERVAL,
        })
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_intervals(
        mut self,
        sample_interval: Duration,
        sensor_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if sample_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "sample interval",
            });
        }
        if sensor_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "sensor interval",
            });
        }

        self.sample_interval = sample_interval;
        self.sensor_interval = sensor_interval;
        Ok(self)
    }
}
