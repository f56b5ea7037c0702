//! surgeguard math utilities.

pub mod math;

pub use math::logistic::*;
pub use math::smoothing::*;
