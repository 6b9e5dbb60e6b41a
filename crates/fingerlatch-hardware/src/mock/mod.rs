//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod board;
pub mod sensor;
pub mod servo;

// Re-export commonly used types
pub use board::{MockBoard, MockBoardHandle};
pub use sensor::{MockSensor, MockSensorHandle};
pub use servo::{MockServo, MockServoHandle};
