//! List command implementation

use super::load_registry;
use super::output::{self, OutputFormat};
use anyhow::Result;
use octofhir_measure_registry::{CombinationRule, MeasureSpec};
use serde::Serialize;
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Configuration for list command
pub struct ListConfig {
    pub registry: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Serialize, Tabled)]
struct MeasureRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ages")]
    ages: String,
    #[tabled(rename = "Genders")]
    genders: String,
    #[tabled(rename = "Numerator")]
    rule: String,
}

fn describe_rule(spec: &MeasureSpec) -> String {
    let ids = || {
        spec.modalities
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
    };
    match &spec.rule {
        CombinationRule::AnyOf => format!("any of {}", ids().join(", ")),
        CombinationRule::AllOf => format!("all of {}", ids().join(", ")),
        CombinationRule::Threshold {
            medication,
            threshold_pct,
            ..
        } => format!("PDC {} >= {}%", medication.id(), threshold_pct),
    }
}

/// List measures in the registry
pub fn list(config: ListConfig) -> Result<()> {
    let registry = load_registry(config.registry.as_deref())?;
    let rows: Vec<MeasureRow> = registry
        .measures()
        .iter()
        .map(|spec| MeasureRow {
            id: spec.id.clone(),
            name: spec.name.clone(),
            ages: format!("{}-{}", spec.age_min, spec.age_max),
            genders: spec
                .genders
                .iter()
                .map(|g| g.code().to_string())
                .collect::<Vec<_>>()
                .join("/"),
            rule: describe_rule(spec),
        })
        .collect();

    let content = match config.output_format {
        OutputFormat::Json => output::format_json(&rows, false)?,
        OutputFormat::Pretty => output::format_json(&rows, true)?,
        OutputFormat::Table => format!(
            "{}\n{}",
            registry.version(),
            Table::new(rows).with(Style::modern())
        ),
    };
    output::write_output(&content, config.output_file.as_deref())
}
