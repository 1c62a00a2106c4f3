//! Evaluate command implementation

use super::load_registry;
use super::output::{self, OutputFormat};
use anyhow::{Context, Result, bail};
use octofhir_measure_diagnostics::Diagnostic;
use octofhir_measure_eval::{MeasureEngine, MeasureRun, MemberMeasureResult, PopulationSummary};
use octofhir_measure_model::Dataset;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for evaluate command
pub struct EvaluateConfig {
    /// Measure ids; `all` expands to every registered measure
    pub measures: Vec<String>,
    pub year: i32,
    pub data: PathBuf,
    pub registry: Option<PathBuf>,
    pub gaps_only: bool,
    pub summary_only: bool,
    pub verbose: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Serialized shape of one measure run
#[derive(Serialize)]
struct Report<'a> {
    summary: &'a PopulationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<&'a MemberMeasureResult>>,
}

/// Evaluate measures over a dataset
pub fn evaluate(config: EvaluateConfig) -> Result<()> {
    let registry = load_registry(config.registry.as_deref())?;

    let measures: Vec<String> = if config.measures.iter().any(|m| m.eq_ignore_ascii_case("all")) {
        registry.ids()
    } else {
        config.measures.clone()
    };
    if measures.is_empty() {
        bail!("No measures specified");
    }

    let dataset = Dataset::from_json_file(&config.data)
        .with_context(|| format!("Failed to load dataset: {}", config.data.display()))?;
    if config.verbose {
        eprintln!(
            "Loaded {} members from {} ({} data-quality warnings)",
            dataset.len(),
            config.data.display(),
            dataset.diagnostics().len()
        );
    }
    report_diagnostics(dataset.diagnostics(), config.verbose);

    let mut runs = Vec::with_capacity(measures.len());
    for measure in &measures {
        let engine = MeasureEngine::from_registry(&registry, measure, config.year)
            .with_context(|| format!("Failed to configure measure {}", measure))?;
        let run = engine
            .evaluate_population(&dataset)
            .with_context(|| format!("Failed to evaluate measure {}", measure))?;
        runs.push(run);
    }

    let content = match config.output_format {
        OutputFormat::Json => output::format_json(&reports(&runs, &config), false)?,
        OutputFormat::Pretty => output::format_json(&reports(&runs, &config), true)?,
        OutputFormat::Table => tables(&runs, &config),
    };
    output::write_output(&content, config.output_file.as_deref())
}

fn report_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    if diagnostics.is_empty() {
        return;
    }
    if verbose {
        output::print_diagnostics(diagnostics, 50);
    } else {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "{} data-quality warnings (use --verbose to list)",
                diagnostics.len()
            ))
        );
    }
}

fn selected<'a>(run: &'a MeasureRun, config: &EvaluateConfig) -> Option<Vec<&'a MemberMeasureResult>> {
    if config.summary_only {
        None
    } else if config.gaps_only {
        Some(run.work_list())
    } else {
        Some(run.results.iter().collect())
    }
}

fn reports<'a>(runs: &'a [MeasureRun], config: &EvaluateConfig) -> Vec<Report<'a>> {
    runs.iter()
        .map(|run| Report {
            summary: &run.summary,
            results: selected(run, config),
        })
        .collect()
}

fn tables(runs: &[MeasureRun], config: &EvaluateConfig) -> String {
    let mut sections = Vec::new();
    for run in runs {
        sections.push(output::format_summary_table(&run.summary));
        if !config.summary_only {
            sections.push(output::format_gap_table(&run.work_list()));
        }
    }
    sections.join("\n\n")
}
