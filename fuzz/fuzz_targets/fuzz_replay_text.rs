//! Fuzz target for the line-oriented replay reader.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sg_core::{replay, Detector, VecSink};

fuzz_target!(|data: &[u8]| {
    let Ok(mut detector) = Detector::new(16, 2.0, 1e-5) else {
        return;
    };
    let mut sink = VecSink::new();
    if let Ok(summary) = replay(data, &mut detector, &mut sink) {
        assert_eq!(summary.events as usize, sink.observations().len());
    }
});
