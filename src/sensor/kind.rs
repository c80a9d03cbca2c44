use std::{fmt, ops::RangeInclusive};

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Humidity,
    Temperature,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Humidity => "humidity",
            SensorKind::Temperature => "temperature",
        }
    }

    /// Inclusive range the emulator draws values from.
    pub fn range(&self) -> RangeInclusive<f64> {
        match self {
            SensorKind::Humidity => 30.0..=70.0,
            SensorKind::Temperature => 15.0..=35.0,
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.range())
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
