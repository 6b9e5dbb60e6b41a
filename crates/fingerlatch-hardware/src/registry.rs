//! Name-based device registry.
//!
//! The host hands the latch controller dependency *names*
//! (`board`, `servo`, `sensor` in the configuration). The registry maps
//! those names to shared device handles so a controller can be built, and
//! rebuilt on reconfiguration, without owning the devices itself.
//!
//! # Examples
//!
//! ```
//! use fingerlatch_core::LatchConfig;
//! use fingerlatch_hardware::mock::{MockBoard, MockSensor, MockServo};
//! use fingerlatch_hardware::registry::DeviceRegistry;
//!
//! let mut registry = DeviceRegistry::new();
//! registry.register_board("board-1", MockBoard::default());
//! registry.register_servo("servo-1", MockServo::new().0);
//! registry.register_sensor("sensor-1", MockSensor::new().0);
//!
//! let config = LatchConfig::new("board-1", "servo-1", "sensor-1").unwrap();
//! let devices = registry.resolve(&config).unwrap();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use fingerlatch_core::LatchConfig;
use tracing::debug;

use crate::devices::{AnyBoard, AnySensor, AnyServo};
use crate::{HardwareError, Result};

/// The three device handles a latch controller runs against.
#[derive(Debug, Clone)]
pub struct ResolvedDevices {
    /// Digital I/O board.
    pub board: Arc<AnyBoard>,

    /// Latch servo.
    pub servo: Arc<AnyServo>,

    /// Fingerprint sensor.
    pub sensor: Arc<AnySensor>,
}

/// Registry of named device handles.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    boards: HashMap<String, Arc<AnyBoard>>,
    servos: HashMap<String, Arc<AnyServo>>,
    sensors: HashMap<String, Arc<AnySensor>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a board under `name`, replacing any previous one.
    pub fn register_board(&mut self, name: impl Into<String>, board: impl Into<AnyBoard>) {
        self.boards.insert(name.into(), Arc::new(board.into()));
    }

    /// Register a servo under `name`, replacing any previous one.
    pub fn register_servo(&mut self, name: impl Into<String>, servo: impl Into<AnyServo>) {
        self.servos.insert(name.into(), Arc::new(servo.into()));
    }

    /// Register a sensor under `name`, replacing any previous one.
    pub fn register_sensor(&mut self, name: impl Into<String>, sensor: impl Into<AnySensor>) {
        self.sensors.insert(name.into(), Arc::new(sensor.into()));
    }

    /// Look up a board by name.
    ///
    /// # Errors
    /// Returns `HardwareError::DependencyNotFound` if no board has that name.
    pub fn board(&self, name: &str) -> Result<Arc<AnyBoard>> {
        lookup(&self.boards, "Board", name)
    }

    /// Look up a servo by name.
    ///
    /// # Errors
    /// Returns `HardwareError::DependencyNotFound` if no servo has that name.
    pub fn servo(&self, name: &str) -> Result<Arc<AnyServo>> {
        lookup(&self.servos, "Servo", name)
    }

    /// Look up a sensor by name.
    ///
    /// # Errors
    /// Returns `HardwareError::DependencyNotFound` if no sensor has that name.
    pub fn sensor(&self, name: &str) -> Result<Arc<AnySensor>> {
        lookup(&self.sensors, "Sensor", name)
    }

    /// Resolve all three dependencies named by `config`.
    ///
    /// # Errors
    /// Returns `HardwareError::DependencyNotFound` for the first name that
    /// is not registered, checked in board/servo/sensor order.
    pub fn resolve(&self, config: &LatchConfig) -> Result<ResolvedDevices> {
        let devices = ResolvedDevices {
            board: self.board(&config.board)?,
            servo: self.servo(&config.servo)?,
            sensor: self.sensor(&config.sensor)?,
        };
        debug!(
            "Resolved latch dependencies board={} servo={} sensor={}",
            config.board, config.servo, config.sensor
        );
        Ok(devices)
    }
}

fn lookup<T>(devices: &HashMap<String, Arc<T>>, kind: &str, name: &str) -> Result<Arc<T>> {
    devices
        .get(name)
        .cloned()
        .ok_or_else(|| HardwareError::dependency_not_found(kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBoard, MockSensor, MockServo};

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        registry.register_board("board-1", MockBoard::default());
        registry.register_servo("servo-1", MockServo::new().0);
        registry.register_sensor("sensor-1", MockSensor::new().0);
        registry
    }

    #[test]
    fn test_resolve_all() {
        let config = LatchConfig::new("board-1", "servo-1", "sensor-1").unwrap();
        assert!(registry().resolve(&config).is_ok());
    }

    #[test]
    fn test_resolve_missing_servo() {
        let config = LatchConfig::new("board-1", "servo-2", "sensor-1").unwrap();
        let error = registry().resolve(&config).unwrap_err();

        match error {
            HardwareError::DependencyNotFound { kind, name } => {
                assert_eq!(kind, "Servo");
                assert_eq!(name, "servo-2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_shares_handles() {
        let registry = registry();
        let config = LatchConfig::new("board-1", "servo-1", "sensor-1").unwrap();

        let first = registry.resolve(&config).unwrap();
        let second = registry.resolve(&config).unwrap();
        assert!(Arc::ptr_eq(&first.servo, &second.servo));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = registry();
        let before = registry.sensor("sensor-1").unwrap();

        registry.register_sensor("sensor-1", MockSensor::new().0);
        let after = registry.sensor("sensor-1").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
