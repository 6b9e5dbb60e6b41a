//! Enum wrappers for hardware device dispatch.
//!
//! The capability traits return `impl Future`, so they cannot be used as
//! trait objects (`Box<dyn MatchSensor>`). The enums in this module provide
//! concrete type dispatch instead, which is what the [`DeviceRegistry`]
//! stores and what the controller runs against when devices are resolved
//! by name.
//!
//! # Examples
//!
//! ```
//! use fingerlatch_hardware::devices::AnySensor;
//! use fingerlatch_hardware::mock::MockSensor;
//!
//! let (sensor, _handle) = MockSensor::new();
//! let any_sensor = AnySensor::Mock(sensor);
//!
//! // Can now be used polymorphically through the MatchSensor trait
//! ```
//!
//! [`DeviceRegistry`]: crate::registry::DeviceRegistry

use fingerlatch_core::Degrees;

use crate::mock::{MockBoard, MockSensor, MockServo};
use crate::traits::{BoardDevice, MatchSensor, ServoDevice};
use crate::{DeviceInfo, Result, SensorReadings};

/// Enum wrapper for fingerprint sensor dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySensor {
    /// Mock sensor for development and testing.
    Mock(MockSensor),
}

impl MatchSensor for AnySensor {
    async fn get_readings(&self) -> Result<SensorReadings> {
        match self {
            Self::Mock(device) => device.get_readings().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockSensor> for AnySensor {
    fn from(device: MockSensor) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for servo dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyServo {
    /// Mock servo for development and testing.
    Mock(MockServo),
}

impl ServoDevice for AnyServo {
    async fn move_to(&self, angle: Degrees) -> Result<()> {
        match self {
            Self::Mock(device) => device.move_to(angle).await,
        }
    }

    async fn position(&self) -> Result<Option<Degrees>> {
        match self {
            Self::Mock(device) => device.position().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockServo> for AnyServo {
    fn from(device: MockServo) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for board dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyBoard {
    /// Mock board for development and testing.
    Mock(MockBoard),
}

impl BoardDevice for AnyBoard {
    async fn set_pin(&self, pin: &str, high: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_pin(pin, high).await,
        }
    }

    async fn get_pin(&self, pin: &str) -> Result<bool> {
        match self {
            Self::Mock(device) => device.get_pin(pin).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockBoard> for AnyBoard {
    fn from(device: MockBoard) -> Self {
        Self::Mock(device)
    }
}
