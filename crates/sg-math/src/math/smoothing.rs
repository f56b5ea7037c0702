//! Adaptive exponential smoothing for event-rate estimation.
//!
//! The smoothing weight is not fixed: each update is weighted by how much of
//! the observation window the newest inter-arrival gap covers. Long gaps
//! relative to the window pull the estimate harder toward the newest sample.

/// Smoothing weight for one update: `gap / span`.
///
/// Returns NaN when `span` is not strictly positive or either input is NaN.
/// For `0 < gap <= span` the result lies in `(0, 1]`.
pub fn adaptive_alpha(gap: f64, span: f64) -> f64 {
    if gap.is_nan() || span.is_nan() || span <= 0.0 {
        return f64::NAN;
    }
    gap / span
}

/// Events per time unit for `events` observations covering `span`.
///
/// Returns NaN when `span` is not strictly positive.
pub fn window_rate(events: usize, span: f64) -> f64 {
    if span.is_nan() || span <= 0.0 {
        return f64::NAN;
    }
    events as f64 / span
}

/// One step of exponential smoothing with a caller-supplied weight.
///
/// `alpha * sample + (1 - alpha) * prev`. With `alpha` in `[0, 1]` the result
/// is a convex combination of the two inputs.
pub fn smooth(prev: f64, sample: f64, alpha: f64) -> f64 {
    alpha * sample + (1.0 - alpha) * prev
}

/// Ratio of an instantaneous rate to its smoothed baseline.
///
/// Returns NaN when the baseline is not strictly positive.
pub fn rate_ratio(rate: f64, baseline: f64) -> f64 {
    if baseline.is_nan() || baseline <= 0.0 {
        return f64::NAN;
    }
    rate / baseline
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
    fn alpha_is_gap_fraction() {
        assert!(approx_eq(adaptive_alpha(4.0, 16.0), 0.25, 1e-15));
        assert!(approx_eq(adaptive_alpha(16.0, 16.0), 1.0, 1e-15));
    }

    #[test]
    fn alpha_rejects_empty_span() {
        assert!(adaptive_alpha(1.0, 0.0).is_nan());
        assert!(adaptive_alpha(1.0, -3.0).is_nan());
        assert!(adaptive_alpha(f64::NAN, 3.0).is_nan());
    }

    #[test]
    fn window_rate_basic() {
        assert!(approx_eq(window_rate(256, 1024.0), 0.25, 1e-15));
        assert!(window_rate(3, 0.0).is_nan());
    }

    #[test]
    fn smooth_full_weight_takes_sample() {
        assert!(approx_eq(smooth(7.0, 3.0, 1.0), 3.0, 1e-15));
        assert!(approx_eq(smooth(7.0, 3.0, 0.0), 7.0, 1e-15));
    }

    #[test]
    fn smooth_is_convex() {
        let out = smooth(2.0, 4.0, 0.25);
        assert!(approx_eq(out, 2.5, 1e-15));
    }

    #[test]
    fn ratio_needs_positive_baseline() {
        assert!(approx_eq(rate_ratio(0.5, 0.25), 2.0, 1e-15));
        assert!(rate_ratio(0.5, 0.0).is_nan());
    }
}
