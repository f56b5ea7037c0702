//! Configuration loading: resolve a base, layer overrides, validate once.
//!
//! The base configuration is an explicit preset when one is requested,
//! otherwise the first `detector.json` found by [`resolve_config`], otherwise
//! the built-in defaults. Field overrides apply last.

use std::path::PathBuf;

use tracing::debug;

use crate::detector::{ConfigOverrides, DetectorConfig};
use crate::preset::{get_preset, PresetName};
use crate::resolve::{resolve_config, ConfigSource};
use crate::validate::{validate_detector, ValidationResult};

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit config file path (highest priority file).
    pub config_path: Option<PathBuf>,
    /// Named preset; takes the place of any discovered file.
    pub preset: Option<PresetName>,
    /// Per-field overrides applied after the base is chosen.
    pub overrides: ConfigOverrides,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated detector configuration.
    pub config: DetectorConfig,
    /// Path of the file the base came from (None for presets/defaults).
    pub path: Option<PathBuf>,
    /// Where the base came from.
    pub source: ConfigSource,
    /// Preset used as the base, if any.
    pub preset: Option<PresetName>,
}

/// Load, override, and validate the detector configuration.
pub fn load_config(options: &ConfigOptions) -> ValidationResult<ResolvedConfig> {
    let (mut config, path, source) = match options.preset {
        Some(preset) => (get_preset(preset), None, ConfigSource::BuiltinDefault),
        None => {
            let resolved = resolve_config(options.config_path.as_deref());
            match resolved.path {
                Some(path) => {
                    let config = DetectorConfig::from_file(&path)?;
                    (config, Some(path), resolved.source)
                }
                None => (DetectorConfig::default(), None, resolved.source),
            }
        }
    };

    config.apply(&options.overrides);
    validate_detector(&config)?;

    debug!(
        source = %source,
        path = ?path,
        preset = ?options.preset,
        capacity = config.capacity,
        threshold = config.threshold,
        decay_constant = config.decay_constant,
        origin = config.origin,
        "detector config resolved"
    );

    Ok(ResolvedConfig {
        config,
        path,
        source,
        preset: options.preset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;

    #[test]
    fn preset_base_with_override() {
        let options = ConfigOptions {
            preset: Some(PresetName::Tolerant),
            overrides: ConfigOverrides {
                capacity: Some(64),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = load_config(&options).unwrap();
        assert_eq!(resolved.config.capacity, 64);
        assert_eq!(resolved.config.threshold, 3.0);
        assert_eq!(resolved.preset, Some(PresetName::Tolerant));
        assert!(resolved.path.is_none());
    }

    #[test]
    fn invalid_override_is_rejected() {
        let options = ConfigOptions {
            preset: Some(PresetName::Default),
            overrides: ConfigOverrides {
                threshold: Some(0.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }
}
