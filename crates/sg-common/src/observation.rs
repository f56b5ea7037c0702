//! Event timestamps and the per-event observation record.
//!
//! An [`Observation`] is everything a results sink receives for one event:
//! the rate ratio, whether it crossed the spike threshold, and the admit
//! probability in effect after the event.

use serde::{Deserialize, Serialize};

/// Integer time coordinate of one observed event.
///
/// Units are whatever the traffic source uses (ticks, milliseconds, ...);
/// the detector only requires successive values to strictly increase.
pub type Timestamp = u64;

/// Detector output for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Timestamp of the event that produced this observation.
    pub timestamp: Timestamp,

    /// Instantaneous rate divided by the smoothed baseline rate.
    pub ratio: f64,

    /// Whether `ratio` exceeded the configured threshold.
    pub is_spike: bool,

    /// Probability with which downstream work should be admitted.
    pub admit_probability: f64,

    /// False while the history window still reaches back to the origin.
    pub warm: bool,
}

impl Observation {
    /// Gate decision for a caller-supplied uniform draw in `[0, 1)`.
    pub fn admit(&self, draw: f64) -> bool {
        draw < self.admit_probability
    }

    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"timestamp":{},"error":"serialization_failed"}}"#,
                self.timestamp
            )
        })
    }
}
