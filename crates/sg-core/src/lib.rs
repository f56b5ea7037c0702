//! surgeguard core library.
//!
//! A streaming rate-spike detector for a single event stream:
//! - `history`: ring buffer of recent timestamps
//! - `estimator`: adaptive smoothed rate and the instantaneous/baseline ratio
//! - `spike`: threshold test and post-spike admit probability
//! - `detector`: the three composed behind `Detector::process`
//! - `sink` and `replay`: delivering observations and replaying recorded streams
//!
//! The `sg-core` binary entry point is in `main.rs`.

pub mod detector;
pub mod estimator;
pub mod exit_codes;
pub mod history;
pub mod logging;
pub mod replay;
pub mod sink;
pub mod spike;

pub use detector::{Detector, DetectorStats};
pub use estimator::{RateEstimator, RateSample};
pub use history::{HistoryBuffer, Window};
pub use replay::{replay, ReplayError, ReplaySummary};
pub use sink::{JsonlSink, NullSink, ObservationSink, SpikesOnly, VecSink};
pub use spike::{Classification, Phase, SpikeGate};

pub use sg_common::{Error, Observation, Result, Timestamp};
pub use sg_config::DetectorConfig;
