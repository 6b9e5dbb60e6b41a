//! Mock servo implementation for testing and development.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fingerlatch_core::Degrees;

use crate::{
    HardwareError, Result,
    traits::ServoDevice,
    types::DeviceInfo,
};

/// Mock servo that records every accepted move.
///
/// # Examples
///
/// ```
/// use fingerlatch_core::Degrees;
/// use fingerlatch_hardware::mock::MockServo;
/// use fingerlatch_hardware::traits::ServoDevice;
///
/// #[tokio::main]
/// async fn main() -> fingerlatch_hardware::Result<()> {
///     let (servo, handle) = MockServo::new();
///
///     servo.move_to(Degrees::new(180).unwrap()).await?;
///     assert_eq!(handle.moves(), vec![Degrees::new(180).unwrap()]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockServo {
    state: Arc<Mutex<ServoState>>,
    name: String,
}

#[derive(Debug, Default)]
struct ServoState {
    /// Accepted moves, oldest first
    moves: Vec<Degrees>,

    /// Every move attempt, including rejected ones
    attempts: Vec<Degrees>,

    position: Option<Degrees>,

    /// Number of upcoming moves to reject
    reject_remaining: u32,
}

impl MockServo {
    /// Create a new mock servo with the default name.
    pub fn new() -> (Self, MockServoHandle) {
        Self::with_name("Mock Servo".to_string())
    }

    /// Create a new mock servo with a custom name.
    pub fn with_name(name: String) -> (Self, MockServoHandle) {
        let state = Arc::new(Mutex::new(ServoState::default()));

        let servo = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };
        let handle = MockServoHandle { state, name };

        (servo, handle)
    }
}

impl Default for MockServo {
    fn default() -> Self {
        Self::new().0
    }
}

impl ServoDevice for MockServo {
    async fn move_to(&self, angle: Degrees) -> Result<()> {
        let mut state = lock(&self.state);
        state.attempts.push(angle);

        if state.reject_remaining > 0 {
            state.reject_remaining -= 1;
            return Err(HardwareError::rejected(
                self.name.clone(),
                format!("refused move to {angle}"),
            ));
        }

        state.moves.push(angle);
        state.position = Some(angle);
        Ok(())
    }

    async fn position(&self) -> Result<Option<Degrees>> {
        Ok(lock(&self.state).position)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Servo v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for inspecting and controlling a mock servo.
#[derive(Debug, Clone)]
pub struct MockServoHandle {
    state: Arc<Mutex<ServoState>>,
    name: String,
}

impl MockServoHandle {
    /// Accepted moves, oldest first.
    pub fn moves(&self) -> Vec<Degrees> {
        lock(&self.state).moves.clone()
    }

    /// Number of accepted moves.
    pub fn move_count(&self) -> usize {
        lock(&self.state).moves.len()
    }

    /// Every move attempt, including rejected ones.
    pub fn attempts(&self) -> Vec<Degrees> {
        lock(&self.state).attempts.clone()
    }

    /// Current position, if the servo has moved.
    pub fn position(&self) -> Option<Degrees> {
        lock(&self.state).position
    }

    /// Reject the next `count` move commands.
    pub fn reject_next(&self, count: u32) {
        lock(&self.state).reject_remaining = count;
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn lock(state: &Mutex<ServoState>) -> MutexGuard<'_, ServoState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deg(angle: u8) -> Degrees {
        Degrees::new(angle).unwrap()
    }

    #[tokio::test]
    async fn test_mock_servo_records_moves() {
        let (servo, handle) = MockServo::new();

        servo.move_to(deg(180)).await.unwrap();
        servo.move_to(deg(90)).await.unwrap();

        assert_eq!(handle.moves(), vec![deg(180), deg(90)]);
        assert_eq!(handle.position(), Some(deg(90)));
        assert_eq!(servo.position().await.unwrap(), Some(deg(90)));
    }

    #[tokio::test]
    async fn test_mock_servo_reject_next() {
        let (servo, handle) = MockServo::new();

        handle.reject_next(1);
        let result = servo.move_to(deg(180)).await;
        assert!(matches!(result, Err(HardwareError::Rejected { .. })));
        assert_eq!(handle.move_count(), 0);
        assert_eq!(handle.position(), None);

        servo.move_to(deg(180)).await.unwrap();
        assert_eq!(handle.move_count(), 1);
        assert_eq!(handle.attempts(), vec![deg(180), deg(180)]);
    }

    #[tokio::test]
    async fn test_mock_servo_get_device_info() {
        let (servo, handle) = MockServo::with_name("Latch Servo".to_string());

        let info = servo.get_info().await.unwrap();
        assert_eq!(info.name, "Latch Servo");
        assert_eq!(handle.name(), "Latch Servo");
    }
}
