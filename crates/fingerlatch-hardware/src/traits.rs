//! Hardware device trait definitions.
//!
//! This module defines the capability contracts the latch controller
//! consumes: a fingerprint sensor that reports match state, a servo that
//! moves to a discrete angle, and a digital I/O board. The controller only
//! depends on these traits, so mock and real drivers are interchangeable.
//!
//! Methods are declared as `fn ... -> impl Future<Output = _> + Send` rather
//! than bare `async fn` so that generic code can spawn the returned futures
//! on the Tokio runtime. Implementations may still be written with
//! `async fn`; the compiler checks that their futures are `Send`.

use std::future::Future;

use fingerlatch_core::Degrees;

use crate::error::Result;
use crate::types::{DeviceInfo, Reading, SensorReadings};

/// Fingerprint sensor that reports whether the current finger matches.
///
/// All methods take `&self`: the control loop and the controller share the
/// same handle, so implementations use interior mutability where needed.
///
/// # Examples
///
/// ```no_run
/// use fingerlatch_hardware::traits::MatchSensor;
/// use fingerlatch_hardware::error::Result;
///
/// async fn wait_for_match<S: MatchSensor>(sensor: &S) -> Result<()> {
///     loop {
///         if sensor.read_match().await?.is_match() {
///             return Ok(());
///         }
///     }
/// }
/// ```
pub trait MatchSensor: Send + Sync {
    /// Read the sensor's raw readings object.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - A communication error occurs
    fn get_readings(&self) -> impl Future<Output = Result<SensorReadings>> + Send;

    /// Read the sensor and decode the match flags.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`get_readings`](Self::get_readings), or
    /// `InvalidData` if a flag is not a boolean.
    fn read_match(&self) -> impl Future<Output = Result<Reading>> + Send {
        async move {
            let readings = self.get_readings().await?;
            Reading::from_readings(&readings)
        }
    }

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    fn get_info(&self) -> impl Future<Output = Result<DeviceInfo>> + Send;
}

/// Servo that holds the latch at a commanded angle.
pub trait ServoDevice: Send + Sync {
    /// Move the servo to `angle`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - The servo rejects the command
    fn move_to(&self, angle: Degrees) -> impl Future<Output = Result<()>> + Send;

    /// Last angle the servo was commanded to, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    fn position(&self) -> impl Future<Output = Result<Option<Degrees>>> + Send;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    fn get_info(&self) -> impl Future<Output = Result<DeviceInfo>> + Send;
}

/// Digital I/O board the servo and sensor are wired to.
///
/// The control loop does not drive board pins; the controller keeps the
/// handle so the board stays resolved for as long as the latch is configured.
pub trait BoardDevice: Send + Sync {
    /// Drive a named GPIO pin high or low.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin does not exist or the board is disconnected.
    fn set_pin(&self, pin: &str, high: bool) -> impl Future<Output = Result<()>> + Send;

    /// Read a named GPIO pin.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin does not exist or the board is disconnected.
    fn get_pin(&self, pin: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    fn get_info(&self) -> impl Future<Output = Result<DeviceInfo>> + Send;
}
