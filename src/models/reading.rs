use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sensor::SensorIdentity;

/// One physical read, straight from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl RawSample {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// A single labelled value of a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRecord {
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// The six persisted fields of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRow {
    pub sensor_id: i64,
    pub room: String,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl SensorRow {
    pub fn from_record(identity: &SensorIdentity, record: &FormattedRecord) -> Self {
        Self {
            sensor_id: identity.id,
            room: identity.room.clone(),
            sensor_type: record.label.clone(),
            value: record.value,
            unit: record.unit.clone(),
            timestamp: record.timestamp,
        }
    }
}
