//! Quality-measure diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the measure engine:
//! structured error codes, the run-level error type, and the data-quality
//! diagnostics that are recorded (never raised) for individual input records.

mod error;
mod error_code;
mod record;

pub use error::*;
pub use error_code::*;
pub use record::*;

/// Result type for measure operations
pub type Result<T> = std::result::Result<T, MeasureError>;
