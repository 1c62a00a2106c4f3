//! Quality-Measure Compliance Engine
//!
//! This crate evaluates members of a population against a declarative
//! [`MeasureSpec`](octofhir_measure_registry::MeasureSpec) for one
//! measurement year. Each member passes through a fixed pipeline:
//!
//! - **Eligibility**: gender, age at Dec 31, continuous enrollment,
//!   qualifying encounter, condition diagnosis, minimum fills
//! - **Exclusion**: ordered rules, first match wins
//! - **Numerator**: ANY-of modalities with independent lookback windows,
//!   ALL-of concurrent tests, or a PDC adherence threshold
//! - **Gaps**: gap type, additive priority score and outreach action
//!
//! Member results are then tabulated by the population aggregator.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_measure_eval::MeasureEngine;
//! use octofhir_measure_model::Dataset;
//! use octofhir_measure_registry::CodeSetRegistry;
//!
//! let registry = CodeSetRegistry::builtin()?;
//! let engine = MeasureEngine::from_registry(&registry, "COL", 2025)?;
//! let dataset = Dataset::from_json_file("members.json")?;
//!
//! let run = engine.evaluate_population(&dataset);
//! println!("rate: {:.1}%", run.summary.rate);
//! for gap in run.work_list() {
//!     println!("{} {:?}", gap.member_id, gap.gap_type);
//! }
//! ```
//!
//! # Concurrency
//!
//! Member evaluation is a pure function of the member's own records and the
//! shared spec. With the `parallel` feature (default) members are evaluated
//! with rayon and partial tallies are combined through
//! [`PopulationTally::merge`], which is associative and commutative.

pub mod aggregate;
pub mod context;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod gaps;
pub mod numerator;
pub mod pdc;
pub mod result;

#[cfg(test)]
mod testing;

pub use aggregate::{PopulationSummary, PopulationTally};
pub use context::{DateWindow, MeasurementPeriod};
pub use eligibility::{Eligibility, evaluate_eligibility};
pub use engine::{MeasureEngine, MeasureRun};
pub use error::{EvalError, EvalResult};
pub use exclusion::{Exclusion, evaluate_exclusions};
pub use gaps::{GapType, Priority, classify_gap, prioritize};
pub use numerator::{ModalityEvidence, NumeratorOutcome, evaluate_numerator};
pub use pdc::{PdcResult, calculate_pdc, calculate_pdc_day_set, class_fills, fills_within};
pub use result::MemberMeasureResult;
