//! Adaptive rate estimator.
//!
//! For every event the estimator compares the instantaneous rate over the
//! history window with a smoothed long-run rate. The smoothing weight is the
//! share of the window covered by the newest inter-arrival gap, so a quiet
//! stream that suddenly speeds up moves the baseline slowly while the
//! instantaneous rate reacts at once.
//!
//! Unfilled history slots stand for the configured `origin`. With the
//! default origin of 0 this is the same arithmetic as a zero-initialised
//! ring: the first event always sees `alpha = 1` and a ratio of exactly 1.

use serde::Serialize;
use sg_common::{Error, Result, Timestamp};
use sg_math::{adaptive_alpha, rate_ratio, smooth, window_rate};

use crate::history::HistoryBuffer;

/// Intermediate values computed for one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSample {
    /// Events per time unit across the current window.
    pub rate: f64,
    /// Smoothed baseline after this event.
    pub filtered_rate: f64,
    /// `rate / filtered_rate`.
    pub ratio: f64,
    /// Smoothing weight used for this update.
    pub alpha: f64,
    /// True once the window no longer reaches back to the origin.
    pub warm: bool,
}

/// History buffer plus the smoothed rate it feeds.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    history: HistoryBuffer,
    origin: Timestamp,
    filtered_rate: f64,
}

impl RateEstimator {
    pub fn new(capacity: usize, origin: Timestamp) -> Result<Self> {
        Ok(Self {
            history: HistoryBuffer::new(capacity)?,
            origin,
            filtered_rate: 0.0,
        })
    }

    /// Fold `timestamp` into the estimate.
    ///
    /// Rejected timestamps leave the estimator exactly as it was.
    pub fn observe(&mut self, timestamp: Timestamp) -> Result<RateSample> {
        self.check_order(timestamp)?;

        let window = self.history.preview();
        let start = window.oldest.unwrap_or(self.origin);
        let previous = window.previous.unwrap_or(self.origin);

        let span = (timestamp - start) as f64;
        let gap = (timestamp - previous) as f64;

        let alpha = adaptive_alpha(gap, span);
        let rate = window_rate(window.filled, span);
        let filtered_rate = smooth(self.filtered_rate, rate, alpha);
        let ratio = rate_ratio(rate, filtered_rate);

        if !ratio.is_finite() || !filtered_rate.is_finite() {
            return Err(Error::NumericalInstability(format!(
                "timestamp {}: rate={} filtered_rate={} alpha={}",
                timestamp, rate, filtered_rate, alpha
            )));
        }

        self.history.record(timestamp);
        self.filtered_rate = filtered_rate;

        Ok(RateSample {
            rate,
            filtered_rate,
            ratio,
            alpha,
            warm: window.oldest.is_some(),
        })
    }

    fn check_order(&self, timestamp: Timestamp) -> Result<()> {
        match self.history.latest() {
            Some(previous) if timestamp <= previous => {
                Err(Error::NonMonotonicTimestamp {
                    previous,
                    timestamp,
                })
            }
            None if timestamp <= self.origin => Err(Error::TimestampAtOrigin {
                origin: self.origin,
                timestamp,
            }),
            _ => Ok(()),
        }
    }

    pub fn filtered_rate(&self) -> f64 {
        self.filtered_rate
    }

    pub fn origin(&self) -> Timestamp {
        self.origin
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Most recently accepted timestamp.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.history.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn first_event_has_unit_ratio() {
        let mut est = RateEstimator::new(8, 0).unwrap();
        let s = est.observe(5).unwrap();
        assert_eq!(s.alpha, 1.0);
        assert!(approx_eq(s.rate, 0.2, 1e-15));
        assert_eq!(s.filtered_rate, s.rate);
        assert_eq!(s.ratio, 1.0);
        assert!(!s.warm);
    }

    #[test]
    fn warm_up_uses_origin_for_unfilled_slots() {
        let mut est = RateEstimator::new(8, 0).unwrap();
        est.observe(4).unwrap();
        let s = est.observe(6).unwrap();
        // span reaches back to origin 0: two events over 6 units
        assert!(approx_eq(s.rate, 2.0 / 6.0, 1e-15));
        assert!(approx_eq(s.alpha, 2.0 / 6.0, 1e-15));
    }

    #[test]
    fn constant_gap_from_origin_stays_at_unit_ratio() {
        let mut est = RateEstimator::new(16, 0).unwrap();
        for i in 1..=200u64 {
            let s = est.observe(i * 3).unwrap();
            assert!(approx_eq(s.ratio, 1.0, 1e-12), "event {}: {}", i, s.ratio);
        }
        assert!(approx_eq(est.filtered_rate(), 1.0 / 3.0, 1e-12));
    }

    #[test]
    fn becomes_warm_after_capacity_events() {
        let mut est = RateEstimator::new(4, 0).unwrap();
        let warm: Vec<bool> = (1..=6).map(|t| est.observe(t).unwrap().warm).collect();
        assert_eq!(warm, vec![false, false, false, false, true, true]);
    }

    #[test]
    fn custom_origin_shifts_warm_up() {
        let mut est = RateEstimator::new(4, 1_000).unwrap();
        let s = est.observe(1_010).unwrap();
        assert!(approx_eq(s.rate, 0.1, 1e-15));
        assert_eq!(s.ratio, 1.0);
    }

    #[test]
    fn rejects_timestamp_at_origin() {
        let mut est = RateEstimator::new(4, 10).unwrap();
        assert!(matches!(
            est.observe(10),
            Err(Error::TimestampAtOrigin {
                origin: 10,
                timestamp: 10
            })
        ));
        assert!(est.history().is_empty());
        assert!(est.observe(11).is_ok());
    }

    #[test]
    fn rejects_repeated_and_backwards_timestamps() {
        let mut est = RateEstimator::new(4, 0).unwrap();
        est.observe(5).unwrap();
        let before = est.filtered_rate();

        assert!(matches!(
            est.observe(5),
            Err(Error::NonMonotonicTimestamp {
                previous: 5,
                timestamp: 5
            })
        ));
        assert!(matches!(
            est.observe(3),
            Err(Error::NonMonotonicTimestamp { .. })
        ));

        assert_eq!(est.filtered_rate(), before);
        assert_eq!(est.history().len(), 1);
        assert_eq!(est.last_timestamp(), Some(5));
    }

    #[test]
    fn burst_raises_ratio_above_one() {
        let mut est = RateEstimator::new(8, 0).unwrap();
        let mut t = 0;
        for _ in 0..64 {
            t += 10;
            est.observe(t).unwrap();
        }
        t += 1;
        let s = est.observe(t).unwrap();
        assert!(s.ratio > 1.0);
        assert!(s.filtered_rate > 0.0);
    }
}
