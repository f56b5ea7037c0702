//! The composed rate-spike detector.
//!
//! `Detector` owns one history buffer, one rate estimator, and one spike
//! gate. It is a plain value with no interior mutability: callers running
//! several streams keep one detector per stream and serialize access to
//! each.

use serde::Serialize;
use sg_common::{Error, Observation, Result, Timestamp};
use sg_config::{validate_detector, DetectorConfig};
use tracing::{debug, warn};

use crate::estimator::RateEstimator;
use crate::spike::{Phase, SpikeGate};

/// Running counters over everything a detector has processed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DetectorStats {
    /// Accepted events.
    pub events: u64,
    /// Accepted events classified as spikes.
    pub spikes: u64,
    /// Timestamps rejected by the ordering check.
    pub rejected: u64,
    /// Timestamp of the most recent spike.
    pub last_spike: Option<Timestamp>,
    /// Largest ratio seen so far (0 before the first event).
    pub max_ratio: f64,
}

/// Streaming rate-spike detector.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
    estimator: RateEstimator,
    gate: SpikeGate,
    stats: DetectorStats,
}

impl Detector {
    /// Build a detector with origin 0.
    ///
    /// Fails if `capacity < 2`, `threshold` is not a finite value `>= 1`, or
    /// `decay_constant` is not finite and positive.
    pub fn new(capacity: usize, threshold: f64, decay_constant: f64) -> Result<Self> {
        Self::from_config(&DetectorConfig::new(capacity, threshold, decay_constant))
    }

    /// Build a detector from a full configuration, validating it first.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        validate_detector(config).map_err(Error::from)?;

        debug!(
            capacity = config.capacity,
            threshold = config.threshold,
            decay_constant = config.decay_constant,
            origin = config.origin,
            "detector created"
        );

        Ok(Self {
            config: config.clone(),
            estimator: RateEstimator::new(config.capacity, config.origin)?,
            gate: SpikeGate::new(config.threshold, config.decay_constant),
            stats: DetectorStats::default(),
        })
    }

    /// Feed one event and get its observation.
    ///
    /// Timestamps must strictly increase, and the first must be after the
    /// configured origin. A rejected timestamp returns an error and leaves
    /// the detector unchanged, so the stream can continue.
    pub fn process(&mut self, timestamp: Timestamp) -> Result<Observation> {
        let sample = match self.estimator.observe(timestamp) {
            Ok(sample) => sample,
            Err(err) => {
                self.stats.rejected += 1;
                warn!(
                    timestamp,
                    code = err.code(),
                    error = %err,
                    "timestamp rejected"
                );
                return Err(err);
            }
        };

        let class = self.gate.classify(timestamp, sample.ratio);

        self.stats.events += 1;
        if sample.ratio > self.stats.max_ratio {
            self.stats.max_ratio = sample.ratio;
        }
        if class.is_spike {
            self.stats.spikes += 1;
            self.stats.last_spike = Some(timestamp);
            debug!(
                event = "detector.spike",
                timestamp,
                ratio = sample.ratio,
                filtered_rate = sample.filtered_rate,
                admit_probability = class.admit_probability,
                "rate spike"
            );
        }

        Ok(Observation {
            timestamp,
            ratio: sample.ratio,
            is_spike: class.is_spike,
            admit_probability: class.admit_probability,
            warm: sample.warm,
        })
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Current smoothed baseline rate (0 before the first event).
    pub fn filtered_rate(&self) -> f64 {
        self.estimator.filtered_rate()
    }

    /// Admit probability at an arbitrary time, e.g. between events.
    pub fn admit_probability_at(&self, timestamp: Timestamp) -> f64 {
        self.gate.admit_probability_at(timestamp)
    }

    /// Spike state, for callers that want the recovery curve itself.
    pub fn gate(&self) -> &SpikeGate {
        &self.gate
    }

    /// Most recently accepted timestamp.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.estimator.last_timestamp()
    }
}
