//! CLI command tests writing to temporary files

#![cfg(feature = "cli")]

use octofhir_measure::cli::evaluate::{EvaluateConfig, evaluate};
use octofhir_measure::cli::list::{ListConfig, list};
use octofhir_measure::cli::output::OutputFormat;
use octofhir_measure::cli::validate::{ValidateConfig, validate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn demo() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/population.json"))
}

fn config(measures: &[&str], out: PathBuf) -> EvaluateConfig {
    EvaluateConfig {
        measures: measures.iter().map(|m| m.to_string()).collect(),
        year: 2025,
        data: demo(),
        registry: None,
        gaps_only: false,
        summary_only: false,
        verbose: false,
        output_format: OutputFormat::Json,
        output_file: Some(out),
    }
}

fn read_json(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_evaluate_writes_json_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("col.json");
    evaluate(config(&["COL"], out.clone())).unwrap();

    let report = read_json(&out);
    assert_eq!(report[0]["summary"]["measure_id"], "COL");
    assert_eq!(report[0]["summary"]["numerator"], 3);
    assert_eq!(report[0]["results"].as_array().unwrap().len(), 9);
}

#[test]
fn test_gaps_only_in_outreach_order() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("gaps.json");
    let mut config = config(&["COL"], out.clone());
    config.gaps_only = true;
    evaluate(config).unwrap();

    let report = read_json(&out);
    let ids: Vec<&str> = report[0]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["member_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["M003", "M002"]);
    assert_eq!(report[0]["results"][0]["gap_type"], "never_screened");
}

#[test]
fn test_all_measures_summary_only() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("all.json");
    let mut config = config(&["all"], out.clone());
    config.summary_only = true;
    evaluate(config).unwrap();

    let report = read_json(&out);
    let reports = report.as_array().unwrap();
    assert_eq!(reports.len(), 8);
    assert!(reports.iter().all(|r| r.get("results").is_none()));
}

#[test]
fn test_unknown_measure_fails() {
    let dir = TempDir::new().unwrap();
    let err = evaluate(config(&["NOPE"], dir.path().join("x.json"))).unwrap_err();
    assert!(format!("{:#}", err).contains("NOPE"));
}

#[rstest]
#[case(OutputFormat::Json)]
#[case(OutputFormat::Pretty)]
#[case(OutputFormat::Table)]
fn test_list_formats(#[case] format: OutputFormat) {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("list.txt");
    list(ListConfig {
        registry: None,
        output_format: format,
        output_file: Some(out.clone()),
    })
    .unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("PDC-STA"));
}

#[test]
fn test_validate_strict_flags_warnings() {
    let strict = ValidateConfig {
        registry: None,
        data: vec![demo()],
        strict: true,
        verbose: false,
    };
    assert!(validate(strict).is_err());

    let lenient = ValidateConfig {
        registry: None,
        data: vec![demo()],
        strict: false,
        verbose: false,
    };
    assert!(validate(lenient).is_ok());
}

#[test]
fn test_custom_registry_file() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("registry.json");
    let catalogue = octofhir_measure::CodeSetRegistry::builtin().unwrap().to_catalogue();
    fs::write(&registry, serde_json::to_string(&catalogue).unwrap()).unwrap();

    let out = dir.path().join("bcs.json");
    let mut config = config(&["BCS"], out.clone());
    config.registry = Some(registry);
    evaluate(config).unwrap();

    assert_eq!(read_json(&out)[0]["summary"]["measure_id"], "BCS");
}
