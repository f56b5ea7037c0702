//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::detector::DetectorConfig;

/// Largest history window accepted.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::UnknownPreset(_) => 67,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for sg_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                sg_common::Error::InvalidConfig { field, message }
            }
            other => sg_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate a detector configuration semantically.
pub fn validate_detector(config: &DetectorConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.capacity < 2 {
        return Err(ValidationError::InvalidValue {
            field: "capacity".to_string(),
            message: format!("Must be at least 2, got {}", config.capacity),
        });
    }

    if config.capacity > MAX_CAPACITY {
        return Err(ValidationError::InvalidValue {
            field: "capacity".to_string(),
            message: format!("Must be at most {}, got {}", MAX_CAPACITY, config.capacity),
        });
    }

    // Below 1 a quieter-than-baseline event would count as a spike and the
    // admit probability could exceed 1.
    if !config.threshold.is_finite() || config.threshold < 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "threshold".to_string(),
            message: format!("Must be finite and >= 1, got {}", config.threshold),
        });
    }

    if !config.decay_constant.is_finite() || config.decay_constant <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "decay_constant".to_string(),
            message: format!("Must be finite and positive, got {}", config.decay_constant),
        });
    }

    Ok(())
}
