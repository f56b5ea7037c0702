//! surgeguard common types and errors.
//!
//! This crate provides foundational types shared across the surgeguard crates:
//! - Event timestamps and the per-event observation record
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod observation;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use observation::{Observation, Timestamp};
pub use output::OutputFormat;

/// Schema version for observation records and summaries.
pub const SCHEMA_VERSION: &str = "1.0.0";
