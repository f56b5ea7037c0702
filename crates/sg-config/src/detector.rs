//! Detector configuration types.
//!
//! `DetectorConfig` is the on-disk shape of `detector.json` as well as the
//! in-memory configuration handed to the detector. Every field has a default,
//! so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use sg_common::Timestamp;

use crate::validate::ValidationError;

/// Default number of timestamps kept in the history window.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default ratio above which an event counts as a spike.
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Default admit-probability decay constant, per time unit.
pub const DEFAULT_DECAY_CONSTANT: f64 = 0.00001;

/// Rate-spike detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Schema version for compatibility checking.
    pub schema_version: String,

    /// Ring buffer size (number of recent timestamps kept). Must be >= 2.
    pub capacity: usize,

    /// Spike cutoff for `rate / filtered_rate`. Must be finite and >= 1.
    pub threshold: f64,

    /// Recovery speed of the admit probability after a spike. Must be > 0.
    pub decay_constant: f64,

    /// Time coordinate that unfilled history slots stand for during warm-up.
    /// The first timestamp must be strictly greater.
    pub origin: Timestamp,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            capacity: DEFAULT_CAPACITY,
            threshold: DEFAULT_THRESHOLD,
            decay_constant: DEFAULT_DECAY_CONSTANT,
            origin: 0,
        }
    }
}

impl DetectorConfig {
    /// Create a config with explicit core parameters and origin 0.
    pub fn new(capacity: usize, threshold: f64, decay_constant: f64) -> Self {
        Self {
            capacity,
            threshold,
            decay_constant,
            ..Default::default()
        }
    }

    /// Set the warm-up origin.
    pub fn with_origin(mut self, origin: Timestamp) -> Self {
        self.origin = origin;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Serialization failed: {}", e)))
    }

    /// Apply field-level overrides (e.g. from CLI flags).
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(capacity) = overrides.capacity {
            self.capacity = capacity;
        }
        if let Some(threshold) = overrides.threshold {
            self.threshold = threshold;
        }
        if let Some(decay) = overrides.decay_constant {
            self.decay_constant = decay;
        }
        if let Some(origin) = overrides.origin {
            self.origin = origin;
        }
    }
}

/// Optional per-field overrides layered on top of a file or preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub capacity: Option<usize>,
    pub threshold: Option<f64>,
    pub decay_constant: Option<f64>,
    pub origin: Option<Timestamp>,
}

impl ConfigOverrides {
    /// True when no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.capacity.is_none()
            && self.threshold.is_none()
            && self.decay_constant.is_none()
            && self.origin.is_none()
    }
}
