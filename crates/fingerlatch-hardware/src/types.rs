//! Common types shared across hardware device implementations.
//!
//! This module defines device metadata and the fingerprint [`Reading`]
//! decoded from a sensor's raw readings object.

use fingerlatch_core::constants::{READING_FINGER_DETECTED, READING_MATCHED};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HardwareError, Result};

/// Raw readings object returned by a sensor.
///
/// Sensors report arbitrary key/value pairs; the latch only looks at
/// `finger_detected` and `matched`.
pub type SensorReadings = Map<String, Value>;

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model and
/// firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "R503", "MockServo").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// One poll of the fingerprint sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// A finger is resting on the sensor.
    pub finger_detected: bool,

    /// The finger matched an enrolled template.
    pub matched: bool,
}

impl Reading {
    /// A detected finger that matched.
    pub const MATCH: Reading = Reading {
        finger_detected: true,
        matched: true,
    };

    /// No finger on the sensor.
    pub const IDLE: Reading = Reading {
        finger_detected: false,
        matched: false,
    };

    /// A detected finger that did not match.
    pub const REJECTED: Reading = Reading {
        finger_detected: true,
        matched: false,
    };

    /// Whether this reading should open the latch.
    pub fn is_match(&self) -> bool {
        self.finger_detected && self.matched
    }

    /// Decode a reading from a raw readings object.
    ///
    /// Absent or `null` keys count as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidData`] if either key holds a
    /// non-boolean value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fingerlatch_hardware::types::Reading;
    /// use serde_json::json;
    ///
    /// let raw = json!({"finger_detected": true, "matched": true, "confidence": 212});
    /// let reading = Reading::from_readings(raw.as_object().unwrap()).unwrap();
    /// assert!(reading.is_match());
    ///
    /// let empty = serde_json::Map::new();
    /// assert_eq!(Reading::from_readings(&empty).unwrap(), Reading::IDLE);
    /// ```
    pub fn from_readings(readings: &SensorReadings) -> Result<Self> {
        Ok(Self {
            finger_detected: flag(readings, READING_FINGER_DETECTED)?,
            matched: flag(readings, READING_MATCHED)?,
        })
    }

    /// Encode this reading as a raw readings object.
    pub fn to_readings(&self) -> SensorReadings {
        let mut readings = Map::new();
        readings.insert(
            READING_FINGER_DETECTED.to_string(),
            Value::Bool(self.finger_detected),
        );
        readings.insert(READING_MATCHED.to_string(), Value::Bool(self.matched));
        readings
    }
}

fn flag(readings: &SensorReadings, key: &str) -> Result<bool> {
    match readings.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(HardwareError::invalid_data(format!(
            "{key} must be a boolean, got {other}"
        ))),
    }
}
