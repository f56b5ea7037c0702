//! Logistic admit curve used after a detected rate spike.
//!
//! `p(t) = 1 / (1 + excess * exp(-decay * t))` where `t` is the time elapsed
//! since the spike. At `t = 0` the probability dips to `1 / (1 + excess)` and
//! it climbs back toward 1 as `t` grows.

use serde::{Deserialize, Serialize};

/// Admit probability `elapsed` time units after a spike of size `excess`.
///
/// A non-positive `excess` means there is nothing to recover from and yields
/// exactly 1. NaN inputs propagate.
pub fn admit_probability(excess: f64, decay: f64, elapsed: f64) -> f64 {
    if excess.is_nan() || decay.is_nan() || elapsed.is_nan() {
        return f64::NAN;
    }
    if excess <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + excess * (-decay * elapsed).exp())
}

/// Elapsed time after which [`admit_probability`] reaches `target`.
///
/// Returns 0 when the curve already starts at or above `target`, and
/// infinity when `target >= 1` (the curve only approaches 1).
pub fn elapsed_to_reach(excess: f64, decay: f64, target: f64) -> f64 {
    if excess.is_nan() || decay.is_nan() || target.is_nan() || decay <= 0.0 || target <= 0.0 {
        return f64::NAN;
    }
    if target >= 1.0 {
        return f64::INFINITY;
    }
    if excess <= 0.0 {
        return 0.0;
    }
    // 1 / (1 + e * exp(-k t)) = p  <=>  t = ln(e * p / (1 - p)) / k
    let t = (excess * target / (1.0 - target)).ln() / decay;
    t.max(0.0)
}

/// Recovery curve left behind by the most recent spike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdmitCurve {
    /// Overshoot above baseline at the spike (`ratio - 1`).
    pub excess: f64,
    /// Decay constant per time unit.
    pub decay: f64,
}

impl AdmitCurve {
    pub fn new(excess: f64, decay: f64) -> Self {
        Self { excess, decay }
    }

    /// Probability `elapsed` time units after the spike.
    pub fn at(&self, elapsed: f64) -> f64 {
        admit_probability(self.excess, self.decay, elapsed)
    }

    /// Time until the curve reaches `target`.
    pub fn time_to(&self, target: f64) -> f64 {
        elapsed_to_reach(self.excess, self.decay, target)
    }

    /// Lowest point of the curve, reached at the spike itself.
    pub fn floor(&self) -> f64 {
        self.at(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn no_excess_is_certain_admit() {
        assert_eq!(admit_probability(0.0, 1e-5, 0.0), 1.0);
        assert_eq!(admit_probability(0.0, 1e-5, 1e9), 1.0);
    }

    #[test]
    fn dip_at_spike() {
        let p = admit_probability(1.5, 1e-5, 0.0);
        assert!(approx_eq(p, 1.0 / 2.5, 1e-15));
    }

    #[test]
    fn recovers_toward_one() {
        let early = admit_probability(1.5, 1e-5, 1_000.0);
        let late = admit_probability(1.5, 1e-5, 1_000_000.0);
        let later = admit_probability(1.5, 1e-5, 2_000_000.0);
        assert!(early < late);
        assert!(late < later);
        // 1 / (1 + 1.5 * e^-10) and 1 / (1 + 1.5 * e^-20)
        assert!(late > 0.9999 && late < 0.99995);
        assert!(later > 0.999999);
        assert!(late <= 1.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(admit_probability(f64::NAN, 1e-5, 1.0).is_nan());
        assert!(admit_probability(1.0, 1e-5, f64::NAN).is_nan());
    }

    #[test]
    fn time_to_inverts_curve() {
        let curve = AdmitCurve::new(1.2, 1e-5);
        let t = curve.time_to(0.9);
        assert!(approx_eq(curve.at(t), 0.9, 1e-12));
    }

    #[test]
    fn time_to_edge_cases() {
        let curve = AdmitCurve::new(1.2, 1e-5);
        assert_eq!(curve.time_to(0.1), 0.0);
        assert!(curve.time_to(1.0).is_infinite());
        assert_eq!(AdmitCurve::new(0.0, 1e-5).time_to(0.9), 0.0);
        assert!(AdmitCurve::new(1.0, 0.0).time_to(0.9).is_nan());
    }

    #[test]
    fn floor_matches_dip() {
        let curve = AdmitCurve::new(3.0, 1e-5);
        assert!(approx_eq(curve.floor(), 0.25, 1e-15));
    }
}
