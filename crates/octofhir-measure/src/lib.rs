//! Healthcare quality-measure compliance engine
//!
//! This crate bundles the measure engine:
//! - Tabular member, claim, pharmacy and lab ingestion
//! - A versioned code set registry of declarative measure specs
//! - Eligibility, exclusion and numerator evaluation (including PDC)
//! - Gap classification, outreach priority and population roll-up
//!
//! # Example
//!
//! ```ignore
//! use octofhir_measure::{CodeSetRegistry, Dataset, MeasureEngine};
//!
//! let registry = CodeSetRegistry::builtin()?;
//! let engine = MeasureEngine::from_registry(&registry, "KED", 2025)?;
//! let run = engine.evaluate_population(&Dataset::from_json_file("population.json")?)?;
//! println!("{} gaps", run.summary.gap_count);
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_measure_diagnostics as diagnostics;
pub use octofhir_measure_eval as eval;
pub use octofhir_measure_model as model;
pub use octofhir_measure_registry as registry;

// Convenience re-exports
pub use octofhir_measure_diagnostics::{Diagnostic, MeasureError, Result};
pub use octofhir_measure_eval::{MeasureEngine, MeasureRun, MemberMeasureResult, PopulationSummary};
pub use octofhir_measure_model::Dataset;
pub use octofhir_measure_registry::{CodeSetRegistry, MeasureSpec};

/// Evaluate one measure from the built-in catalogue over a dataset
pub fn evaluate(measure_id: &str, year: i32, dataset: &Dataset) -> Result<MeasureRun> {
    let registry = CodeSetRegistry::builtin()?;
    let engine = MeasureEngine::from_registry(&registry, measure_id, year)?;
    Ok(engine.evaluate_population(dataset)?)
}

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
