//! Latch controller configuration.
//!
//! A [`LatchConfig`] is built from the raw attribute object supplied by the
//! host (a JSON object whose optional numeric fields may arrive either as
//! numbers or as strings). Validation happens entirely here: once a
//! `LatchConfig` exists, every field satisfies its invariant, so the
//! controller never re-checks angles or timeouts at runtime.
//!
//! # Examples
//!
//! ```
//! use fingerlatch_core::config::LatchConfig;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let attrs = json!({
//!     "board": "board-1",
//!     "servo": "latch-servo",
//!     "sensor": "fingerprint",
//!     "leave_open_timeout": "5",
//!     "servo_open_angle": 170,
//! });
//!
//! let config = LatchConfig::from_value(&attrs).unwrap();
//! assert_eq!(config.leave_open_timeout, Duration::from_secs(5));
//! assert_eq!(config.servo_open_angle.as_u8(), 170);
//! assert_eq!(config.servo_closed_angle.as_u8(), 90);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{
    ATTR_BOARD, ATTR_LEAVE_OPEN_TIMEOUT, ATTR_SENSOR, ATTR_SERVO, ATTR_SERVO_CLOSED_ANGLE,
    ATTR_SERVO_OPEN_ANGLE, DEFAULT_LEAVE_OPEN_TIMEOUT_SECS, DEFAULT_SERVO_CLOSED_ANGLE,
    DEFAULT_SERVO_OPEN_ANGLE, MAX_SERVO_ANGLE, MIN_SERVO_ANGLE,
};
use crate::{Degrees, Error, Result};

/// Validated configuration for one latch controller instance.
///
/// `board`, `servo` and `sensor` are opaque names resolved by the host into
/// live device handles. The remaining fields tune the control loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatchConfig {
    /// Name of the digital I/O board dependency.
    pub board: String,

    /// Name of the servo dependency.
    pub servo: String,

    /// Name of the fingerprint sensor dependency.
    pub sensor: String,

    /// Time after the last match before the latch closes again.
    pub leave_open_timeout: Duration,

    /// Angle commanded when the latch opens.
    pub servo_open_angle: Degrees,

    /// Angle commanded when the latch closes.
    pub servo_closed_angle: Degrees,
}

impl LatchConfig {
    /// Create a configuration with default timing and angles.
    ///
    /// # Errors
    /// Returns `Error::ConfigValidation` if any dependency name is empty.
    pub fn new(
        board: impl Into<String>,
        servo: impl Into<String>,
        sensor: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            board: non_empty(ATTR_BOARD, board.into())?,
            servo: non_empty(ATTR_SERVO, servo.into())?,
            sensor: non_empty(ATTR_SENSOR, sensor.into())?,
            leave_open_timeout: Duration::from_secs(DEFAULT_LEAVE_OPEN_TIMEOUT_SECS),
            servo_open_angle: Degrees(DEFAULT_SERVO_OPEN_ANGLE),
            servo_closed_angle: Degrees(DEFAULT_SERVO_CLOSED_ANGLE),
        };
        Ok(config)
    }

    /// Set the leave-open timeout.
    pub fn with_leave_open_timeout(mut self, timeout: Duration) -> Self {
        self.leave_open_timeout = timeout;
        self
    }

    /// Set the open angle.
    pub fn with_open_angle(mut self, angle: Degrees) -> Self {
        self.servo_open_angle = angle;
        self
    }

    /// Set the closed angle.
    pub fn with_closed_angle(mut self, angle: Degrees) -> Self {
        self.servo_closed_angle = angle;
        self
    }

    /// Build a configuration from a raw attribute object.
    ///
    /// Required attributes are `board`, `servo` and `sensor` (non-empty
    /// strings). Optional attributes are `leave_open_timeout` (non-negative
    /// seconds), `servo_open_angle` and `servo_closed_angle` (integers in
    /// 0-180), each accepted as a JSON number or a string encoding one.
    /// A `null` optional attribute is treated as absent.
    ///
    /// # Errors
    /// Returns `Error::ConfigValidation` naming the first field that fails.
    pub fn from_attributes(attrs: &Map<String, Value>) -> Result<Self> {
        let mut config = Self::new(
            required_string(attrs, ATTR_BOARD)?,
            required_string(attrs, ATTR_SERVO)?,
            required_string(attrs, ATTR_SENSOR)?,
        )?;

        if let Some(value) = optional(attrs, ATTR_LEAVE_OPEN_TIMEOUT) {
            config.leave_open_timeout = parse_timeout(value)?;
        }
        if let Some(value) = optional(attrs, ATTR_SERVO_OPEN_ANGLE) {
            config.servo_open_angle = parse_angle(ATTR_SERVO_OPEN_ANGLE, value)?;
        }
        if let Some(value) = optional(attrs, ATTR_SERVO_CLOSED_ANGLE) {
            config.servo_closed_angle = parse_angle(ATTR_SERVO_CLOSED_ANGLE, value)?;
        }

        Ok(config)
    }

    /// Build a configuration from a JSON value that must be an object.
    ///
    /// # Errors
    /// Returns `Error::ConfigValidation` if the value is not an object or
    /// any attribute is invalid.
    pub fn from_value(value: &Value) -> Result<Self> {
        let attrs = value
            .as_object()
            .ok_or_else(|| Error::config("attributes", "must be a JSON object"))?;
        Self::from_attributes(attrs)
    }

    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    /// Returns `Error::Json` for malformed JSON, otherwise the same errors
    /// as [`from_value`](Self::from_value).
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Names of the devices this configuration depends on, in
    /// board/servo/sensor order.
    pub fn dependencies(&self) -> [&str; 3] {
        [&self.board, &self.servo, &self.sensor]
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::config(field, "must not be empty"));
    }
    Ok(value)
}

fn required_string(attrs: &Map<String, Value>, field: &str) -> Result<String> {
    match attrs.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(Error::config(field, "is required and must be a string")),
        None => Err(Error::MissingConfig(field.to_string())),
    }
}

fn optional<'a>(attrs: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    attrs.get(field).filter(|value| !value.is_null())
}

fn parse_timeout(value: &Value) -> Result<Duration> {
    let invalid = || Error::config(ATTR_LEAVE_OPEN_TIMEOUT, "must be a non-negative number");

    let seconds = match value {
        Value::Number(number) => number.as_f64().ok_or_else(invalid)?,
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}

fn parse_angle(field: &str, value: &Value) -> Result<Degrees> {
    let invalid = || {
        Error::config(
            field,
            format!("must be an integer between {MIN_SERVO_ANGLE} and {MAX_SERVO_ANGLE}"),
        )
    };

    let raw = match value {
        Value::Number(number) => match number.as_i64() {
            Some(raw) => raw,
            // Integral floats such as 90.0 are accepted.
            None => number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(u16::MAX))
                .map(|f| f as i64)
                .ok_or_else(invalid)?,
        },
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    Degrees::from_i64(raw).map_err(|_| invalid())
}
