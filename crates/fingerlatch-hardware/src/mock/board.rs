//! Mock digital I/O board.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{HardwareError, Result, traits::BoardDevice, types::DeviceInfo};

/// Mock board with a fixed set of named pins, all initially low.
#[derive(Debug)]
pub struct MockBoard {
    pins: Arc<Mutex<HashMap<String, bool>>>,
    name: String,
}

impl MockBoard {
    /// Create a mock board exposing the given pin names.
    pub fn new<I, S>(pins: I) -> (Self, MockBoardHandle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pins: HashMap<String, bool> = pins.into_iter().map(|pin| (pin.into(), false)).collect();
        let pins = Arc::new(Mutex::new(pins));
        let board = Self {
            pins: Arc::clone(&pins),
            name: "Mock Board".to_string(),
        };

        (board, MockBoardHandle { pins })
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new(["gpio0", "gpio1"]).0
    }
}

impl BoardDevice for MockBoard {
    async fn set_pin(&self, pin: &str, high: bool) -> Result<()> {
        let mut pins = lock(&self.pins);
        let level = pins
            .get_mut(pin)
            .ok_or_else(|| HardwareError::invalid_data(format!("Unknown pin {pin}")))?;
        *level = high;
        Ok(())
    }

    async fn get_pin(&self, pin: &str) -> Result<bool> {
        lock(&self.pins)
            .get(pin)
            .copied()
            .ok_or_else(|| HardwareError::invalid_data(format!("Unknown pin {pin}")))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Board v1.0"))
    }
}

/// Handle for inspecting a mock board.
#[derive(Debug, Clone)]
pub struct MockBoardHandle {
    pins: Arc<Mutex<HashMap<String, bool>>>,
}

impl MockBoardHandle {
    /// Level of a pin, or `None` if the board has no such pin.
    pub fn pin(&self, pin: &str) -> Option<bool> {
        lock(&self.pins).get(pin).copied()
    }
}

fn lock(pins: &Mutex<HashMap<String, bool>>) -> MutexGuard<'_, HashMap<String, bool>> {
    pins.lock().unwrap_or_else(PoisonError::into_inner)
}
