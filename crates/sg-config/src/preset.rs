//! Configuration presets for common traffic profiles.
//!
//! Provides pre-built detector configurations for:
//! - Default: the reference parameters (256 slots, ratio 2, decay 1e-5)
//! - Sensitive: shorter window and lower threshold, flags smaller bursts
//! - Tolerant: longer window and higher threshold for bursty workloads

use crate::detector::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Reference parameters
    Default,
    /// Short window, low threshold, slow recovery
    Sensitive,
    /// Long window, high threshold, fast recovery
    Tolerant,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Default,
        PresetName::Sensitive,
        PresetName::Tolerant,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Sensitive => "sensitive",
            PresetName::Tolerant => "tolerant",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "default" | "reference" | "standard" => Some(PresetName::Default),
            "sensitive" | "strict" => Some(PresetName::Sensitive),
            "tolerant" | "bursty" | "relaxed" => Some(PresetName::Tolerant),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => "Reference parameters: 256-event window, spike at 2x baseline",
            PresetName::Sensitive => {
                "128-event window, spike at 1.5x baseline, slower recovery after a spike"
            }
            PresetName::Tolerant => {
                "512-event window, spike at 3x baseline, faster recovery for bursty traffic"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors that can occur when working with presets.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the detector configuration for a preset.
pub fn get_preset(name: PresetName) -> DetectorConfig {
    match name {
        PresetName::Default => DetectorConfig::default(),
        PresetName::Sensitive => DetectorConfig::new(128, 1.5, 0.000005),
        PresetName::Tolerant => DetectorConfig::new(512, 3.0, 0.00005),
    }
}

/// Summary information about a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub capacity: usize,
    pub threshold: f64,
    pub decay_constant: f64,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let config = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            capacity: config.capacity,
            threshold: config.threshold,
            decay_constant: config.decay_constant,
        }
    }
}

/// List all available presets with their info.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}
