//! Spike classification and post-spike admit probability.
//!
//! A spike is any event whose rate ratio exceeds the threshold. Each spike
//! replaces the stored recovery curve (last spike wins, even if a previous
//! spike was larger); between spikes the admit probability climbs back
//! toward 1 along a logistic curve.

use serde::{Deserialize, Serialize};
use sg_common::Timestamp;
use sg_math::AdmitCurve;

/// Recovery state of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No spike seen yet; admit probability is exactly 1.
    #[default]
    Nominal,
    /// A spike has occurred; probability is below 1 and recovering.
    Recovering,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Nominal => write!(f, "nominal"),
            Phase::Recovering => write!(f, "recovering"),
        }
    }
}

/// Result of classifying one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_spike: bool,
    pub admit_probability: f64,
}

/// Threshold test plus the decay state left by the most recent spike.
#[derive(Debug, Clone)]
pub struct SpikeGate {
    threshold: f64,
    decay_constant: f64,
    last_spike_time: Option<Timestamp>,
    last_spike_excess: f64,
}

impl SpikeGate {
    pub fn new(threshold: f64, decay_constant: f64) -> Self {
        Self {
            threshold,
            decay_constant,
            last_spike_time: None,
            last_spike_excess: 0.0,
        }
    }

    /// Classify the event at `timestamp` and return the admit probability
    /// in effect after it.
    pub fn classify(&mut self, timestamp: Timestamp, ratio: f64) -> Classification {
        let is_spike = ratio > self.threshold;
        if is_spike {
            self.last_spike_time = Some(timestamp);
            self.last_spike_excess = ratio - 1.0;
        }
        Classification {
            is_spike,
            admit_probability: self.admit_probability_at(timestamp),
        }
    }

    /// Admit probability at `timestamp` given the stored spike.
    ///
    /// Times before the last spike are treated as the spike itself.
    pub fn admit_probability_at(&self, timestamp: Timestamp) -> f64 {
        match self.last_spike_time {
            None => 1.0,
            Some(spike) => {
                let elapsed = timestamp.saturating_sub(spike);
                self.curve().at(elapsed as f64)
            }
        }
    }

    /// Recovery curve of the most recent spike (flat at 1 before any spike).
    pub fn curve(&self) -> AdmitCurve {
        AdmitCurve::new(self.last_spike_excess, self.decay_constant)
    }

    pub fn phase(&self) -> Phase {
        if self.last_spike_excess > 0.0 {
            Phase::Recovering
        } else {
            Phase::Nominal
        }
    }

    pub fn last_spike_time(&self) -> Option<Timestamp> {
        self.last_spike_time
    }

    pub fn last_spike_excess(&self) -> f64 {
        self.last_spike_excess
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decay_constant(&self) -> f64 {
        self.decay_constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn nominal_until_first_spike() {
        let mut gate = SpikeGate::new(2.0, 1e-5);
        for t in 1..100 {
            let c = gate.classify(t, 1.9);
            assert!(!c.is_spike);
            assert_eq!(c.admit_probability, 1.0);
        }
        assert_eq!(gate.phase(), Phase::Nominal);
        assert_eq!(gate.last_spike_time(), None);
    }

    #[test]
    fn ratio_equal_to_threshold_is_not_a_spike() {
        let mut gate = SpikeGate::new(2.0, 1e-5);
        assert!(!gate.classify(10, 2.0).is_spike);
    }

    #[test]
    fn probability_dips_to_inverse_ratio_at_spike() {
        let mut gate = SpikeGate::new(2.0, 1e-5);
        let c = gate.classify(500, 3.0);
        assert!(c.is_spike);
        assert!(approx_eq(c.admit_probability, 1.0 / 3.0, 1e-15));
        assert_eq!(gate.phase(), Phase::Recovering);
        assert_eq!(gate.last_spike_time(), Some(500));
        assert!(approx_eq(gate.last_spike_excess(), 2.0, 1e-15));
    }

    #[test]
    fn probability_recovers_monotonically() {
        let mut gate = SpikeGate::new(2.0, 1e-3);
        gate.classify(0, 4.0);
        let mut prev = gate.admit_probability_at(0);
        for t in (100..20_000).step_by(100) {
            let c = gate.classify(t, 1.0);
            assert!(!c.is_spike);
            assert!(c.admit_probability > prev);
            assert!(c.admit_probability <= 1.0);
            prev = c.admit_probability;
        }
        assert!(prev > 0.99);
        // recovery never resets the phase by itself
        assert_eq!(gate.phase(), Phase::Recovering);
    }

    #[test]
    fn last_spike_wins_over_larger_earlier_spike() {
        let mut gate = SpikeGate::new(2.0, 1e-5);
        gate.classify(100, 9.0);
        let c = gate.classify(200, 2.5);
        assert!(c.is_spike);
        assert!(approx_eq(gate.last_spike_excess(), 1.5, 1e-15));
        assert_eq!(gate.last_spike_time(), Some(200));
        assert!(approx_eq(c.admit_probability, 1.0 / 2.5, 1e-15));
    }

    #[test]
    fn time_before_spike_clamps_to_floor() {
        let mut gate = SpikeGate::new(2.0, 1e-2);
        gate.classify(1_000, 5.0);
        assert_eq!(gate.admit_probability_at(10), gate.curve().floor());
    }

    #[test]
    fn phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Phase::Recovering).unwrap(),
            "\"recovering\""
        );
        assert_eq!(Phase::Nominal.to_string(), "nominal");
    }
}
