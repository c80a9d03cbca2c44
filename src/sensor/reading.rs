use crate::sensor::SensorKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub kind: SensorKind,

    pub value: f64,
}

impl Reading {
    pub fn humidity(value: f64) -> Self {
        Self {
            kind: SensorKind::Humidity,
            value,
        }
    }

    pub fn temperature(value: f64) -> Self {
        Self {
            kind: SensorKind::Temperature,
            value,
        }
    }
}
