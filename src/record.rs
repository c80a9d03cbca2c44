use serde::Serialize;

use crate::sensor::{Reading, SensorKind};

/// Humidity and temperature sampled in the same tick.
///
/// Field order is the order of the serialized telemetry payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub device_time: String,

    pub humidity: f64,

    pub temperature: f64,
}

impl MergedRecord {
    /// Merges one reading of each kind. Returns `None` unless both are present
    /// and tagged with the expected kinds.
    pub fn merge(
        device_time: impl Into<String>,
        humidity: Option<Reading>,
        temperature: Option<Reading>,
    ) -> Option<Self> {
        let humidity = humidity.filter(|r| r.kind == SensorKind::Humidity)?;
        let temperature = temperature.filter(|r| r.kind == SensorKind::Temperature)?;

        Some(Self {
            device_time: device_time.into(),
            humidity: humidity.value,
            temperature: temperature.value,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_only_complete_pairs() {
        let h = Some(Reading::humidity(45.2));
        let t = Some(Reading::temperature(22.1));

        assert_eq!(
            MergedRecord::merge("2024-01-01 12:00:00", h, t),
            Some(MergedRecord {
                device_time: "2024-01-01 12:00:00".to_string(),
                humidity: 45.2,
                temperature: 22.1,
            })
        );
        assert_eq!(MergedRecord::merge("t", h, None), None);
        assert_eq!(MergedRecord::merge("t", None, t), None);
        assert_eq!(MergedRecord::merge("t", None, None), None);
    }

    #[test]
    fn rejects_swapped_kinds() {
        let h = Some(Reading::humidity(45.2));
        let t = Some(Reading::temperature(22.1));

        assert_eq!(MergedRecord::merge("t", t, h), None);
    }

    #[test]
    fn serializes_compactly_in_field_order() {
        let record = MergedRecord {
            device_time: "2024-01-01 12:00:00".to_string(),
            humidity: 45.2,
            temperature: 22.1,
        };

        assert_eq!(
            record.to_json().unwrap(),
            r#"{"device_time":"2024-01-01 12:00:00","humidity":45.2,"temperature":22.1}"#
        );
    }
}
