//! Validate command implementation

use super::load_registry;
use super::output;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use octofhir_measure_diagnostics::Severity;
use octofhir_measure_model::Dataset;
use std::path::PathBuf;

/// Configuration for validate command
pub struct ValidateConfig {
    pub registry: Option<PathBuf>,
    pub data: Vec<PathBuf>,
    /// Treat data-quality warnings as failures
    pub strict: bool,
    pub verbose: bool,
}

/// Validate a catalogue and any number of datasets
pub fn validate(config: ValidateConfig) -> Result<()> {
    let registry = load_registry(config.registry.as_deref())?;
    println!(
        "{} {} ({} measures)",
        "✓".green(),
        registry.version(),
        registry.len()
    );

    let mut total_warnings = 0;
    for path in &config.data {
        let dataset = Dataset::from_json_file(path)
            .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
        let warnings = dataset
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        total_warnings += warnings;

        if warnings == 0 {
            println!("{} {} ({} members)", "✓".green(), path.display(), dataset.len());
        } else {
            println!(
                "{} {} ({} members, {} warnings)",
                "!".yellow(),
                path.display(),
                dataset.len(),
                warnings
            );
            let limit = if config.verbose { usize::MAX } else { 10 };
            output::print_diagnostics(dataset.diagnostics(), limit);
        }
    }

    if config.strict && total_warnings > 0 {
        bail!("{} data-quality warnings in strict mode", total_warnings);
    }
    Ok(())
}
