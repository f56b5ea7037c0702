//! Fuzz target for detector.json parsing and validation.
//!
//! Parsing, validating, and building a detector from arbitrary bytes must
//! never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sg_config::{validate_detector, DetectorConfig};
use sg_core::Detector;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = DetectorConfig::from_json(text) else {
        return;
    };
    if validate_detector(&config).is_ok() && config.capacity <= 1 << 16 {
        assert!(Detector::from_config(&config).is_ok());
    }
});
