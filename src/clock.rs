use chrono::{Local, Utc};
use chrono_tz::Tz;

pub const DEVICE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the wall-clock timestamp stamped on merged records.
pub trait Clock: Send + Sync {
    fn device_time(&self) -> String;
}

/// Current time in the given timezone, or in system local time when none is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn device_time(&self) -> String {
        match self.timezone {
            Some(tz) => Utc::now()
                .with_timezone(&tz)
                .format(DEVICE_TIME_FORMAT)
                .to_string(),
            None => Local::now().format(DEVICE_TIME_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn device_time(&self) -> String {
        self.0.clone()
    }
}
