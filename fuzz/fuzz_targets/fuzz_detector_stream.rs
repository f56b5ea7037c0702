//! Fuzz target for the detector over arbitrary timestamp streams.
//!
//! Any sequence of timestamps, ordered or not, must produce either an
//! observation with a finite ratio and a probability in (0, 1], or an error.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sg_core::Detector;

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    threshold: f64,
    decay: f64,
    timestamps: Vec<u64>,
}

fuzz_target!(|input: Input| {
    let Ok(mut detector) = Detector::new(input.capacity as usize, input.threshold, input.decay)
    else {
        return;
    };

    for t in input.timestamps {
        if let Ok(obs) = detector.process(t) {
            assert!(obs.ratio.is_finite());
            assert!(obs.admit_probability > 0.0 && obs.admit_probability <= 1.0);
        }
    }
});
