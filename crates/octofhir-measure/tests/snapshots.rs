//! Snapshot tests for population runs over the demo dataset
//!
//! Uses insta for snapshot testing of:
//! - Population summaries
//! - Outreach work lists

use insta::assert_snapshot;
use octofhir_measure::{Dataset, MeasureRun, evaluate};
use std::collections::BTreeMap;
use std::fmt::Write;

const DEMO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/population.json");

fn demo() -> Dataset {
    Dataset::from_json_file(DEMO).unwrap()
}

fn pairs(map: &BTreeMap<String, u64>) -> String {
    if map.is_empty() {
        return "-".to_string();
    }
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stable plain-text rendering of a run
fn render(run: &MeasureRun) -> String {
    let s = &run.summary;
    let mut out = String::new();
    writeln!(out, "measure: {} {}", s.measure_id, s.measurement_year).unwrap();
    writeln!(out, "population: {}", s.total_population).unwrap();
    writeln!(out, "denominator: {}", s.denominator).unwrap();
    writeln!(out, "excluded: {}", s.excluded).unwrap();
    writeln!(out, "final_denominator: {}", s.final_denominator).unwrap();
    writeln!(out, "numerator: {}", s.numerator).unwrap();
    writeln!(out, "rate: {:.1}", s.rate).unwrap();
    writeln!(out, "gaps: {} ({:.1})", s.gap_count, s.gap_rate).unwrap();
    writeln!(out, "gap_types: {}", pairs(&s.gap_types)).unwrap();
    writeln!(out, "exclusions: {}", pairs(&s.exclusion_reasons)).unwrap();
    writeln!(out, "modalities: {}", pairs(&s.modalities)).unwrap();
    writeln!(out, "ineligible: {}", pairs(&s.ineligible_reasons)).unwrap();
    writeln!(out, "work_list:").unwrap();
    for gap in run.work_list() {
        writeln!(
            out,
            "  {} {} {} {}: {}",
            gap.member_id,
            gap.gap_label().unwrap_or_default(),
            gap.priority_score.unwrap_or_default(),
            gap.priority_level.map(|l| l.to_string()).unwrap_or_default(),
            gap.recommended_action.clone().unwrap_or_default(),
        )
        .unwrap();
    }
    out
}

#[test]
fn snapshot_col_population() {
    let run = evaluate("COL", 2025, &demo()).unwrap();
    assert_snapshot!("col_population", render(&run));
}

#[test]
fn snapshot_ked_population() {
    let run = evaluate("KED", 2025, &demo()).unwrap();
    assert_snapshot!("ked_population", render(&run));
}

#[test]
fn test_demo_has_data_quality_warning() {
    let dataset = demo();
    assert_eq!(dataset.len(), 9);
    assert!(
        dataset
            .diagnostics()
            .iter()
            .any(|d| d.member_id() == Some("M009"))
    );
}

#[test]
fn test_adherence_measures() {
    let dataset = demo();

    let rasa = evaluate("PDC-RASA", 2025, &dataset).unwrap();
    let m008 = rasa.results.iter().find(|r| r.member_id == "M008").unwrap();
    assert!(m008.in_numerator);
    assert_eq!(m008.days_covered, Some(360));

    let dr = evaluate("PDC-DR", 2025, &dataset).unwrap();
    let m007 = dr.results.iter().find(|r| r.member_id == "M007").unwrap();
    assert_eq!(m007.gap_label().as_deref(), Some("pdc_below_threshold"));
    assert_eq!(m007.priority_score, Some(130));
    assert_eq!(dr.summary.final_denominator, 1);
}
