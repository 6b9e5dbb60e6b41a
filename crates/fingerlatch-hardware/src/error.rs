//! Error types for hardware operations.
//!
//! This module defines error types specific to the latch peripherals,
//! covering sensor disconnection, malformed readings, rejected servo
//! commands and dependencies that cannot be resolved by name.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device refused a command.
    #[error("Command rejected by {device}: {message}")]
    Rejected { device: String, message: String },

    /// A named dependency could not be resolved to a device handle.
    #[error("{kind} dependency not found: {name}")]
    DependencyNotFound { kind: String, name: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new rejected command error.
    pub fn rejected(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create a new dependency-not-found error.
    pub fn dependency_not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DependencyNotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("R503");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: R503");
    }

    #[test]
    fn test_rejected_error() {
        let error = HardwareError::rejected("latch-servo", "stalled");
        assert_eq!(error.to_string(), "Command rejected by latch-servo: stalled");
    }

    #[test]
    fn test_dependency_not_found_error() {
        let error = HardwareError::dependency_not_found("Servo", "servo-9");
        assert_eq!(error.to_string(), "Servo dependency not found: servo-9");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("matched must be a boolean");
        assert!(matches!(error, HardwareError::InvalidData { .. }));
        assert_eq!(error.to_string(), "Invalid data: matched must be a boolean");
    }
}
