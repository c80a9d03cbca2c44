use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use sensor_gateway::{
    config::{CONNECTION_STRING_ENV, DEFAULT_DATABASE_PATH, DEFAULT_SAMPLE_INTERVAL},
    sensor::DEFAULT_SENSOR_INTERVAL,
};
use tracing::warn;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = CONNECTION_STRING_ENV, hide_env_values = true)]
    pub connection_string: Option<String>,

    #[arg(long, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// IANA zone name. Libc-style values such as `:/etc/localtime` fall back to local time.
    #[arg(long, env = "TZ")]
    pub timezone: Option<String>,

    #[arg(long, env = "SAMPLE_INTERVAL_SECS", default_value_t = DEFAULT_SAMPLE_INTERVAL.as_secs())]
    pub sample_interval_secs: u64,

    #[arg(long, env = "SENSOR_INTERVAL_SECS", default_value_t = DEFAULT_SENSOR_INTERVAL.as_secs())]
    pub sensor_interval_secs: u64,

    /// Loaded into the environment before env-backed arguments are resolved.
    #[arg(long, default_value = "secrets.env")]
    pub env_file: PathBuf,
}

impl Args {
    pub fn timezone(&self) -> Option<Tz> {
        let name = self.timezone.as_deref()?;
        match name.parse() {
            Ok(tz) => Some(tz),
            Err(_) => {
                warn!(timezone = name, "unrecognized timezone, using local time");
                None
            }
        }
    }
}
