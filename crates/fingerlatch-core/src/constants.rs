//! Core constants for the fingerprint latch controller.
//!
//! This module centralizes the defaults and limits shared by the
//! configuration layer, the hardware adapters and the control loop. Keeping
//! them in one place ensures the validator and the runtime agree on the same
//! bounds.
//!
//! # Usage
//!
//! Constants are organized by category for easy discovery:
//!
//! ```
//! use fingerlatch_core::constants::*;
//! use std::time::Duration;
//!
//! // Servo range
//! fn is_valid_angle(angle: u8) -> bool {
//!     (MIN_SERVO_ANGLE..=MAX_SERVO_ANGLE).contains(&angle)
//! }
//! assert!(is_valid_angle(DEFAULT_SERVO_OPEN_ANGLE));
//!
//! // Loop timing
//! let interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
//! assert_eq!(interval.as_millis(), 200);
//! ```

// ============================================================================
// Servo Angles
// ============================================================================

/// Lowest angle a servo can be commanded to, in degrees.
pub const MIN_SERVO_ANGLE: u8 = 0;

/// Highest angle a servo can be commanded to, in degrees.
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Angle that holds the latch open when no `servo_open_angle` is configured.
pub const DEFAULT_SERVO_OPEN_ANGLE: u8 = 180;

/// Angle that holds the latch closed when no `servo_closed_angle` is configured.
pub const DEFAULT_SERVO_CLOSED_ANGLE: u8 = 90;

// ============================================================================
// Timing
// ============================================================================

/// Seconds the latch stays open after the last confirmed match.
pub const DEFAULT_LEAVE_OPEN_TIMEOUT_SECS: u64 = 60;

/// Delay between two sensor polls, in milliseconds.
///
/// This is the debounce window and the upper bound on reaction latency
/// (excluding the time spent inside the sensor and servo adapters).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// How long `stop()` waits for an in-flight iteration before aborting the task.
pub const STOP_GRACE_PERIOD_MS: u64 = 500;

// ============================================================================
// Configuration Attributes
// ============================================================================

/// Attribute naming the digital I/O board dependency.
pub const ATTR_BOARD: &str = "board";

/// Attribute naming the servo dependency.
pub const ATTR_SERVO: &str = "servo";

/// Attribute naming the fingerprint sensor dependency.
pub const ATTR_SENSOR: &str = "sensor";

/// Optional attribute: seconds before the latch auto-closes.
pub const ATTR_LEAVE_OPEN_TIMEOUT: &str = "leave_open_timeout";

/// Optional attribute: open angle in degrees.
pub const ATTR_SERVO_OPEN_ANGLE: &str = "servo_open_angle";

/// Optional attribute: closed angle in degrees.
pub const ATTR_SERVO_CLOSED_ANGLE: &str = "servo_closed_angle";

// ============================================================================
// Sensor Reading Keys
// ============================================================================

/// Reading key reporting that a finger is on the sensor.
pub const READING_FINGER_DETECTED: &str = "finger_detected";

/// Reading key reporting that the finger matched an enrolled template.
pub const READING_MATCHED: &str = "matched";

// ============================================================================
// Commands
// ============================================================================

/// Command key recognized by the dispatcher.
pub const COMMAND_ACTION: &str = "action";

/// `action` value that starts the control loop.
pub const ACTION_START: &str = "start";

/// `action` value that stops the control loop.
pub const ACTION_STOP: &str = "stop";
