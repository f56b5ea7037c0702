//! surgeguard configuration loading and validation.
//!
//! This crate provides:
//! - The typed `DetectorConfig` (capacity, threshold, decay constant, origin)
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Named presets for common traffic profiles
//! - Semantic validation with stable error codes

pub mod detector;
pub mod load;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use detector::{ConfigOverrides, DetectorConfig};
pub use load::{load_config, ConfigOptions, ResolvedConfig};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use validate::{validate_detector, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
