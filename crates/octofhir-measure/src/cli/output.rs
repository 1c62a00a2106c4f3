//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use octofhir_measure_diagnostics::Diagnostic;
use octofhir_measure_eval::{MemberMeasureResult, PopulationSummary};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    #[value(alias = "json-pretty")]
    Pretty,
    Table,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    let mut out = format!("{} {}", "Error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        out.push_str(&format!("\n  {} {}", "caused by:".dimmed(), cause));
    }
    out
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Print data-quality findings to stderr, most useful first
pub fn print_diagnostics(diagnostics: &[Diagnostic], limit: usize) {
    for diagnostic in diagnostics.iter().take(limit) {
        eprintln!("{}", diagnostic.to_colored_string());
    }
    if diagnostics.len() > limit {
        eprintln!(
            "{}",
            format_warning(&format!("{} more data-quality warnings not shown", diagnostics.len() - limit))
        );
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Serialize any value as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn kv(key: &str, value: impl ToString) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn breakdown(map: &BTreeMap<String, u64>) -> String {
    if map.is_empty() {
        return "-".to_string();
    }
    map.iter()
        .map(|(key, count)| format!("{}: {}", key, count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a population summary as a two-column table
pub fn format_summary_table(summary: &PopulationSummary) -> String {
    let mut rows = vec![
        kv("Measure", &summary.measure_id),
        kv("Measurement year", summary.measurement_year),
        kv("Total population", summary.total_population),
        kv("Denominator", summary.denominator),
        kv("Excluded", summary.excluded),
        kv("Final denominator", summary.final_denominator),
        kv("Numerator", summary.numerator),
        kv("Rate", format!("{:.1}%", summary.rate)),
        kv("Gaps", summary.gap_count),
        kv("Gap rate", format!("{:.1}%", summary.gap_rate)),
    ];
    if let Some(pdc) = summary.average_pdc {
        rows.push(kv("Average PDC", format!("{:.1}%", pdc)));
    }
    rows.push(kv("Gap types", breakdown(&summary.gap_types)));
    rows.push(kv("Priority levels", breakdown(&summary.priority_levels)));
    rows.push(kv("Exclusions", breakdown(&summary.exclusion_reasons)));
    rows.push(kv("Satisfying modality", breakdown(&summary.modalities)));
    rows.push(kv("Not eligible", breakdown(&summary.ineligible_reasons)));

    Table::new(rows).with(Style::modern()).to_string()
}

#[derive(Tabled)]
struct GapRow {
    #[tabled(rename = "Member")]
    member_id: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Gap")]
    gap: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Priority")]
    level: String,
    #[tabled(rename = "Action")]
    action: String,
}

/// Render gap rows in the given order
pub fn format_gap_table(rows: &[&MemberMeasureResult]) -> String {
    if rows.is_empty() {
        return "(no gaps)".to_string();
    }
    let dash = || "-".to_string();
    let rows: Vec<GapRow> = rows
        .iter()
        .map(|r| GapRow {
            member_id: r.member_id.clone(),
            age: r.age.map(|a| a.to_string()).unwrap_or_else(dash),
            gap: r.gap_label().unwrap_or_else(dash),
            score: r.priority_score.map(|s| s.to_string()).unwrap_or_else(dash),
            level: r.priority_level.map(|l| l.to_string()).unwrap_or_else(dash),
            action: r.recommended_action.clone().unwrap_or_else(dash),
        })
        .collect();
    Table::new(rows).with(Style::modern()).to_string()
}
