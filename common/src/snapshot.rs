use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} reading: {value}")]
    InvalidReading { field: &'static str, value: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(rename = "soil")]
    pub soil_moisture: i32,
    #[serde(rename = "light")]
    pub light_level: i32,
    pub is_watering: bool,
    #[serde(default)]
    pub auto_enabled: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceReadings {
    pub soil_moisture: i32,
    pub light_level: i32,
    pub is_watering: bool,
}

impl DeviceSnapshot {
    pub fn readings(&self) -> DeviceReadings {
        DeviceReadings {
            soil_moisture: self.soil_moisture,
            light_level: self.light_level,
            is_watering: self.is_watering,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.soil_moisture < 0 {
            return Err(SnapshotError::InvalidReading {
                field: "soil",
                value: self.soil_moisture,
            });
        }
        if self.light_level < 0 {
            return Err(SnapshotError::InvalidReading {
                field: "light",
                value: self.light_level,
            });
        }
        Ok(())
    }
}

/// `null` means the device has not reported yet. Any shape or type mismatch
/// rejects the whole payload.
pub fn parse_latest(body: &[u8]) -> Result<Option<DeviceSnapshot>, SnapshotError> {
    let parsed = serde_json::from_slice::<Option<DeviceSnapshot>>(body)?;
    if let Some(snapshot) = &parsed {
        snapshot.validate()?;
    }
    Ok(parsed)
}
