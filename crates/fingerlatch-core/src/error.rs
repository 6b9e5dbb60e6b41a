use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration field {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    // Value errors
    #[error("Angle must be {min}-{max} degrees, got {value}")]
    InvalidAngle { value: i64, min: u8, max: u8 },

    #[error("Invalid angle: {0}")]
    InvalidAngleFormat(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration validation error for `field`.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the configuration field this error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConfigValidation { field, .. } => Some(field),
            Self::MissingConfig(key) => Some(key),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_reports_field() {
        let error = Error::config("servo_open_angle", "must be an integer between 0 and 180");
        assert_eq!(error.field(), Some("servo_open_angle"));
        assert_eq!(
            error.to_string(),
            "Invalid configuration field servo_open_angle: must be an integer between 0 and 180"
        );
    }

    #[test]
    fn test_missing_config_reports_key() {
        let error = Error::MissingConfig("board".to_string());
        assert_eq!(error.field(), Some("board"));
        assert_eq!(error.to_string(), "Missing configuration key: board");
    }

    #[test]
    fn test_angle_error_has_no_field() {
        let error = Error::InvalidAngle {
            value: 181,
            min: 0,
            max: 180,
        };
        assert_eq!(error.field(), None);
        assert_eq!(error.to_string(), "Angle must be 0-180 degrees, got 181");
    }
}
