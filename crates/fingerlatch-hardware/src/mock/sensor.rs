//! Mock fingerprint sensor implementation for testing and development.
//!
//! This module provides a simulated match sensor whose readings can be
//! scripted programmatically for testing without physical hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    HardwareError, Result,
    traits::MatchSensor,
    types::{DeviceInfo, Reading, SensorReadings},
};

/// Mock fingerprint sensor for testing and development.
///
/// Each call to `get_readings()` consumes the next scripted entry. When the
/// script is empty the sensor keeps returning its idle reading, which
/// defaults to "no finger".
///
/// # Examples
///
/// ```
/// use fingerlatch_hardware::mock::MockSensor;
/// use fingerlatch_hardware::traits::MatchSensor;
/// use fingerlatch_hardware::types::Reading;
///
/// #[tokio::main]
/// async fn main() -> fingerlatch_hardware::Result<()> {
///     let (sensor, handle) = MockSensor::new();
///
///     handle.queue_reading(Reading::MATCH);
///
///     assert!(sensor.read_match().await?.is_match());
///     assert_eq!(sensor.read_match().await?, Reading::IDLE);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    /// Shared script, also held by the handle
    script: Arc<Mutex<SensorScript>>,

    /// Device name
    name: String,
}

impl MockSensor {
    /// Create a new mock sensor with the default name.
    ///
    /// Returns a tuple of (MockSensor, MockSensorHandle) where the handle
    /// can be used to script readings and failures.
    pub fn new() -> (Self, MockSensorHandle) {
        Self::with_name("Mock Fingerprint Sensor".to_string())
    }

    /// Create a new mock sensor with a custom name.
    pub fn with_name(name: String) -> (Self, MockSensorHandle) {
        let script = Arc::new(Mutex::new(SensorScript::default()));

        let sensor = Self {
            script: Arc::clone(&script),
            name: name.clone(),
        };
        let handle = MockSensorHandle { script, name };

        (sensor, handle)
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new().0
    }
}

impl MatchSensor for MockSensor {
    async fn get_readings(&self) -> Result<SensorReadings> {
        let next = {
            let mut script = lock(&self.script);
            script.reads += 1;
            script.queued.pop_front()
        };

        match next {
            Some(ScriptedReading::Readings(readings)) => Ok(readings),
            Some(ScriptedReading::Failure(message)) => Err(HardwareError::communication(message)),
            Some(ScriptedReading::Hang) => std::future::pending().await,
            None => Ok(lock(&self.script).idle.to_readings()),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(
            DeviceInfo::new(self.name.clone(), "Mock Fingerprint Sensor v1.0")
                .with_firmware_version("1.0.0"),
        )
    }
}

/// Internal script entry for the mock sensor.
#[derive(Debug, Clone)]
enum ScriptedReading {
    Readings(SensorReadings),
    Failure(String),
    Hang,
}

#[derive(Debug, Default)]
struct SensorScript {
    queued: VecDeque<ScriptedReading>,
    idle: Reading,
    reads: u64,
}

/// Handle for controlling a mock fingerprint sensor.
///
/// Cloning the handle is cheap; all clones script the same sensor.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    /// Shared script, also held by the sensor
    script: Arc<Mutex<SensorScript>>,

    /// Device name
    name: String,
}

impl MockSensorHandle {
    /// Queue a decoded reading for the next poll.
    pub fn queue_reading(&self, reading: Reading) {
        self.queue_readings(reading.to_readings());
    }

    /// Queue a raw readings object for the next poll.
    ///
    /// Useful for exercising malformed payloads.
    pub fn queue_readings(&self, readings: SensorReadings) {
        lock(&self.script)
            .queued
            .push_back(ScriptedReading::Readings(readings));
    }

    /// Make the next poll fail with a communication error.
    pub fn queue_failure(&self, message: impl Into<String>) {
        lock(&self.script)
            .queued
            .push_back(ScriptedReading::Failure(message.into()));
    }

    /// Make the next poll never return.
    pub fn queue_hang(&self) {
        lock(&self.script).queued.push_back(ScriptedReading::Hang);
    }

    /// Set the reading returned once the script is exhausted.
    pub fn set_idle_reading(&self, reading: Reading) {
        lock(&self.script).idle = reading;
    }

    /// Number of polls served so far, including failures.
    pub fn read_count(&self) -> u64 {
        lock(&self.script).reads
    }

    /// Number of scripted entries not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.script).queued.len()
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn lock(script: &Mutex<SensorScript>) -> MutexGuard<'_, SensorScript> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}
