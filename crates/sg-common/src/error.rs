//! Error types for surgeguard.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "timestamp 17 is not after previous timestamp 17",
//!   "recoverable": true,
//!   "context": { "previous": 17, "timestamp": 17 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::observation::Timestamp;

/// Result type alias for surgeguard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Detector configuration errors (capacity, threshold, decay, files).
    Config,
    /// Caller-supplied event stream errors (ordering, parsing).
    Input,
    /// Floating point results that would corrupt detector state.
    Numeric,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Numeric => write!(f, "numeric"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for surgeguard.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    // Input errors (20-29)
    #[error("timestamp {timestamp} is not after previous timestamp {previous}")]
    NonMonotonicTimestamp {
        previous: Timestamp,
        timestamp: Timestamp,
    },

    #[error("first timestamp {timestamp} must be after the origin {origin}")]
    TimestampAtOrigin {
        origin: Timestamp,
        timestamp: Timestamp,
    },

    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    // Numeric errors (30-39)
    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Numeric errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::NonMonotonicTimestamp { .. } => 20,
            Error::TimestampAtOrigin { .. } => 21,
            Error::MalformedInput { .. } => 22,
            Error::NumericalInstability(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => ErrorCategory::Config,

            Error::NonMonotonicTimestamp { .. }
            | Error::TimestampAtOrigin { .. }
            | Error::MalformedInput { .. } => ErrorCategory::Input,

            Error::NumericalInstability(_) => ErrorCategory::Numeric,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// A rejected timestamp leaves the detector untouched, so the caller can
    /// keep feeding correctly ordered events. Configuration errors are
    /// recoverable by fixing the configuration.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidConfig { .. } => true,

            Error::NonMonotonicTimestamp { .. } => true,
            Error::TimestampAtOrigin { .. } => true,
            Error::MalformedInput { .. } => false,

            Error::NumericalInstability(_) => false,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'sg-core check' to validate configuration, or check syntax in detector.json."
            }
            Error::InvalidConfig { .. } => {
                "Use capacity >= 2, a finite threshold >= 1, and a positive decay constant."
            }
            Error::NonMonotonicTimestamp { .. } => {
                "Feed events in strictly increasing timestamp order; merge or drop duplicates upstream."
            }
            Error::TimestampAtOrigin { .. } => {
                "Set the detector origin before the first event, e.g. '--origin <first - 1>'."
            }
            Error::MalformedInput { .. } => {
                "Input must contain one unsigned integer timestamp per line; '#' starts a comment."
            }
            Error::NumericalInstability(_) => {
                "Internal numerical issue. Report the input stream that triggered it."
            }
            Error::Io(_) => "Check that the input and output paths exist and are accessible.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq .' or restore from backup.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig { .. } => "Invalid Detector Configuration",
            Error::NonMonotonicTimestamp { .. } => "Out-of-Order Timestamp",
            Error::TimestampAtOrigin { .. } => "Timestamp Not After Origin",
            Error::MalformedInput { .. } => "Malformed Input",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Format for human consumption: headline, reason, and fix.
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., offending timestamps).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidConfig { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::NonMonotonicTimestamp {
                previous,
                timestamp,
            } => {
                context.insert("previous".to_string(), serde_json::json!(previous));
                context.insert("timestamp".to_string(), serde_json::json!(timestamp));
            }
            Error::TimestampAtOrigin { origin, timestamp } => {
                context.insert("origin".to_string(), serde_json::json!(origin));
                context.insert("timestamp".to_string(), serde_json::json!(timestamp));
            }
            Error::MalformedInput { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
