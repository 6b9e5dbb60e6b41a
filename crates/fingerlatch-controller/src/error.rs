//! Error types for building and reconfiguring a latch controller.
//!
//! Only construction-time failures surface here. Failures inside the
//! control loop are absorbed as [`IterationOutcome`](crate::IterationOutcome)s,
//! and lifecycle misuse is logged rather than returned.

use fingerlatch_hardware::HardwareError;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors raised while creating or reconfiguring a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] fingerlatch_core::Error),

    /// A configured dependency could not be resolved.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),
}
