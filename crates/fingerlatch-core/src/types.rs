use crate::{
    Result,
    constants::{MAX_SERVO_ANGLE, MIN_SERVO_ANGLE},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Servo target angle in whole degrees (0-180).
///
/// Every actuator command carries a `Degrees`, so an out-of-range angle is
/// rejected when the value is built rather than when the servo receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Degrees(pub(crate) u8);

impl Degrees {
    /// Create a new angle with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidAngle` if the angle is above 180.
    pub fn new(angle: u8) -> Result<Self> {
        Self::from_i64(i64::from(angle))
    }

    /// Create an angle from a wide integer, as parsed from configuration text.
    ///
    /// # Errors
    /// Returns `Error::InvalidAngle` if the value is outside 0-180.
    pub fn from_i64(value: i64) -> Result<Self> {
        match u8::try_from(value) {
            Ok(angle) if (MIN_SERVO_ANGLE..=MAX_SERVO_ANGLE).contains(&angle) => Ok(Degrees(angle)),
            _ => Err(Error::InvalidAngle {
                value,
                min: MIN_SERVO_ANGLE,
                max: MAX_SERVO_ANGLE,
            }),
        }
    }

    /// Get the raw angle as u8.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

impl TryFrom<u8> for Degrees {
    type Error = Error;

    fn try_from(angle: u8) -> Result<Self> {
        Degrees::new(angle)
    }
}

impl From<Degrees> for u8 {
    fn from(angle: Degrees) -> Self {
        angle.0
    }
}

impl std::str::FromStr for Degrees {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAngleFormat(s.to_string()))?;
        Degrees::from_i64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("90", 90)]
    #[case(" 180 ", 180)]
    fn test_degrees_valid(#[case] input: &str, #[case] expected: u8) {
        let angle: Degrees = input.parse().unwrap();
        assert_eq!(angle.as_u8(), expected);
    }

    #[rstest]
    #[case("181")]
    #[case("-1")]
    #[case("ninety")]
    #[case("90.5")]
    fn test_degrees_invalid(#[case] input: &str) {
        let result: Result<Degrees> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_degrees_from_i64_bounds() {
        assert!(Degrees::from_i64(180).is_ok());
        assert!(matches!(
            Degrees::from_i64(300),
            Err(Error::InvalidAngle { value: 300, .. })
        ));
        assert!(Degrees::new(255).is_err());
    }

    #[test]
    fn test_degrees_display() {
        assert_eq!(Degrees::new(90).unwrap().to_string(), "90°");
    }

    #[test]
    fn test_degrees_serde_rejects_out_of_range() {
        let angle: Degrees = serde_json::from_str("45").unwrap();
        assert_eq!(angle.as_u8(), 45);
        assert_eq!(serde_json::to_string(&angle).unwrap(), "45");

        let result: std::result::Result<Degrees, _> = serde_json::from_str("200");
        assert!(result.is_err());
    }
}
