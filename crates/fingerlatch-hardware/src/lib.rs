//! Hardware capability layer for the fingerprint latch controller.
//!
//! This crate provides trait-based abstractions for the three peripherals a
//! latch depends on: a fingerprint sensor that reports match state, a servo
//! that holds the latch at a commanded angle, and a digital I/O board. The
//! traits let the controller run against mock implementations (for
//! development and testing) or real drivers without changes.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous and return `Send`
//!   futures, so generic code can spawn them on Tokio.
//! - **Shared handles**: Methods take `&self`; devices are held in `Arc` and
//!   shared between the controller and its polling task.
//! - **Thread-safe**: All traits require `Send + Sync`.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Device Traits
//!
//! ## Fingerprint Sensor
//!
//! The [`MatchSensor`] trait reports a raw readings object; its provided
//! `read_match()` decodes the `finger_detected`/`matched` flags:
//!
//! ```no_run
//! use fingerlatch_hardware::traits::MatchSensor;
//! use fingerlatch_hardware::error::Result;
//!
//! async fn is_authorized<S: MatchSensor>(sensor: &S) -> Result<bool> {
//!     Ok(sensor.read_match().await?.is_match())
//! }
//! ```
//!
//! ## Servo
//!
//! The [`ServoDevice`] trait accepts discrete [`Degrees`] targets:
//!
//! ```no_run
//! use fingerlatch_core::Degrees;
//! use fingerlatch_hardware::traits::ServoDevice;
//! use fingerlatch_hardware::error::Result;
//!
//! async fn open<S: ServoDevice>(servo: &S) -> Result<()> {
//!     servo.move_to(Degrees::new(180).unwrap()).await
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`MatchSensor`]: traits::MatchSensor
//! [`ServoDevice`]: traits::ServoDevice
//! [`Degrees`]: fingerlatch_core::Degrees

pub mod devices;
pub mod error;
pub mod mock;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyBoard, AnySensor, AnyServo};
pub use error::{HardwareError, Result};
pub use registry::{DeviceRegistry, ResolvedDevices};
pub use traits::{BoardDevice, MatchSensor, ServoDevice};
pub use types::{DeviceInfo, Reading, SensorReadings};
