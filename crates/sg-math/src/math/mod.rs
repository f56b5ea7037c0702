//! Core math modules.

pub mod logistic;
pub mod smoothing;
