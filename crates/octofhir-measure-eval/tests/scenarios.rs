//! End-to-end member scenarios against the built-in catalogue

use octofhir_measure_eval::{MeasureEngine, MemberMeasureResult};
use octofhir_measure_model::Dataset;
use octofhir_measure_registry::CodeSetRegistry;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const YEAR: i32 = 2025;

fn engine(measure: &str) -> MeasureEngine {
    let registry = CodeSetRegistry::builtin().unwrap();
    MeasureEngine::from_registry(&registry, measure, YEAR).unwrap()
}

fn claim(member: &str, on: &str, claim_type: &str, dx: Option<&str>, px: Option<&str>) -> Value {
    json!({
        "member_id": member,
        "service_date": on,
        "claim_type": claim_type,
        "diagnosis_code": dx,
        "procedure_code": px,
    })
}

fn office_visit(member: &str, on: &str) -> Value {
    claim(member, on, "outpatient", None, Some("99213"))
}

fn fill(member: &str, drug: &str, on: &str, supply: i64) -> Value {
    json!({"member_id": member, "medication_name": drug, "fill_date": on, "days_supply": supply})
}

fn run_one(measure: &str, dataset: Value) -> MemberMeasureResult {
    let dataset = Dataset::from_json(&dataset.to_string()).unwrap();
    let run = engine(measure).evaluate_population(&dataset).unwrap();
    assert_eq!(run.results.len(), 1);
    run.results.into_iter().next().unwrap()
}

/// Monthly fill dates starting Jan 1, `spacing` days apart
fn fill_dates(count: i64, spacing: i64) -> Vec<String> {
    let start = chrono::NaiveDate::from_ymd_opt(YEAR, 1, 1).unwrap();
    (0..count)
        .map(|i| (start + chrono::Duration::days(i * spacing)).to_string())
        .collect()
}

#[test]
fn test_age_45_not_in_denominator() {
    let result = run_one(
        "COL",
        json!({
            "members": [{"member_id": "M001", "birth_date": "1980-06-15", "gender": "F", "enrollment_months": 12}],
            "claims": [office_visit("M001", "2025-02-01")],
        }),
    );

    assert!(!result.in_denominator);
    assert_eq!(result.denominator_reason, "age_too_young_45");
    assert!(!result.in_denominator_final);
    assert!(!result.has_gap);
}

#[test]
fn test_twelve_monthly_fills_compliant() {
    let fills: Vec<Value> = fill_dates(12, 30)
        .iter()
        .map(|on| fill("M002", "Lisinopril 10 MG", on, 30))
        .collect();
    let result = run_one(
        "PDC-RASA",
        json!({
            "members": [{"member_id": "M002", "birth_date": "1955-03-03", "gender": "M"}],
            "pharmacy": fills,
        }),
    );

    assert!(result.in_denominator_final);
    assert_eq!(result.days_covered, Some(360));
    assert_eq!(result.total_days, Some(365));
    assert!((result.pdc.unwrap() - 98.6).abs() < 0.05);
    assert!(result.in_numerator);
    assert!(!result.has_gap);
}

#[test]
fn test_five_sparse_fills_gap() {
    let fills: Vec<Value> = fill_dates(5, 75)
        .iter()
        .map(|on| fill("M003", "atorvastatin 40mg", on, 30))
        .collect();
    let result = run_one(
        "PDC-STA",
        json!({
            "members": [{"member_id": "M003", "birth_date": "1970-03-03", "gender": "F"}],
            "pharmacy": fills,
        }),
    );

    assert_eq!(result.days_covered, Some(150));
    assert!((result.pdc.unwrap() - 41.1).abs() < 0.05);
    assert!(!result.in_numerator);
    assert!(result.has_gap);
    assert_eq!(result.gap_label().as_deref(), Some("pdc_below_threshold"));
}

#[test]
fn test_colonoscopy_eight_years_prior() {
    let result = run_one(
        "COL",
        json!({
            "members": [{"member_id": "M004", "birth_date": "1962-09-09", "gender": "M", "enrollment_months": 12}],
            "claims": [
                office_visit("M004", "2025-05-05"),
                claim("M004", "2017-04-12", "outpatient", Some("Z12.11"), Some("45378")),
            ],
        }),
    );

    assert!(result.in_numerator);
    assert_eq!(result.satisfying_modality.as_deref(), Some("colonoscopy"));
    assert_eq!(result.numerator_reason.as_deref(), Some("compliant_colonoscopy_2017-04-12"));
    assert_eq!(result.evidence_date.map(|d| d.to_string()).as_deref(), Some("2017-04-12"));
}

#[test]
fn test_egfr_without_acr() {
    let result = run_one(
        "KED",
        json!({
            "members": [{"member_id": "M005", "birth_date": "1965-01-20", "gender": "F", "enrollment_months": 12}],
            "claims": [
                claim("M005", "2025-02-10", "outpatient", Some("E11.9"), Some("99214")),
                claim("M005", "2025-06-10", "professional", Some("E11.65"), None),
            ],
            "labs": [{"member_id": "M005", "test_date": "2025-06-10", "test_code": "48642-3", "result_value": "72"}],
        }),
    );

    assert!(result.in_denominator);
    assert!(result.in_denominator_final);
    assert!(!result.in_numerator);
    assert_eq!(result.gap_label().as_deref(), Some("missing_acr"));
    assert_eq!(result.recommended_action.as_deref(), Some("Order uACR"));
}

#[test]
fn test_exclusion_overrides_numerator_evidence() {
    let result = run_one(
        "COL",
        json!({
            "members": [{"member_id": "M006", "birth_date": "1958-11-11", "gender": "F", "enrollment_months": 12}],
            "claims": [
                office_visit("M006", "2025-01-15"),
                claim("M006", "2025-03-01", "outpatient", None, Some("82274")),
                claim("M006", "2016-07-01", "inpatient", Some("Z90.49"), None),
            ],
        }),
    );

    assert!(result.in_denominator);
    assert!(result.excluded);
    assert_eq!(result.exclusion_reason.as_deref(), Some("total_colectomy_history"));
    assert!(!result.in_denominator_final);
    assert!(!result.in_numerator);
    assert!(!result.has_gap);
}

#[test]
fn test_malformed_birth_date_degrades() {
    let dataset = Dataset::from_json(
        &json!({
            "members": [
                {"member_id": "M1", "birth_date": "not-a-date", "gender": "F", "enrollment_months": 12},
                {"member_id": "M2", "birth_date": "1960-01-01", "gender": "F", "enrollment_months": 12},
            ],
            "claims": [office_visit("M1", "2025-02-01"), office_visit("M2", "2025-02-01")],
        })
        .to_string(),
    )
    .unwrap();
    let run = engine("COL").evaluate_population(&dataset).unwrap();

    assert_eq!(run.results[0].denominator_reason, "birth_date_invalid");
    assert!(run.results[1].in_denominator);
    assert!(!run.diagnostics.is_empty());
}

#[test]
fn test_unknown_codes_never_match() {
    let result = run_one(
        "COL",
        json!({
            "members": [{"member_id": "M7", "birth_date": "1960-01-01", "gender": "M"}],
            "claims": [
                office_visit("M7", "2025-02-01"),
                claim("M7", "2025-02-01", "outpatient", Some("QQ999"), Some("00000")),
            ],
        }),
    );
    assert!(!result.in_numerator);
    assert_eq!(result.gap_label().as_deref(), Some("never_screened"));
}

#[test]
fn test_oversized_supply_from_text_covers_year() {
    let result = run_one(
        "PDC-RASA",
        json!({
            "members": [{"member_id": "M8", "birth_date": "1950-01-01", "gender": "F"}],
            "pharmacy": [
                {"member_id": "M8", "medication_name": "valsartan", "fill_date": "2025-01-01", "days_supply": "1e20"},
                fill("M8", "valsartan", "2025-03-01", 30),
            ],
        }),
    );

    assert_eq!(result.days_covered, Some(365));
    assert_eq!(result.pdc, Some(100.0));
    assert!(result.in_numerator);
}

fn diabetic(member: &str) -> Vec<Value> {
    vec![
        claim(member, "2024-09-12", "professional", Some("E11.9"), None),
        office_visit(member, "2025-04-02"),
    ]
}

#[test]
fn test_diabetic_with_statin_fill() {
    let result = run_one(
        "SUPD",
        json!({
            "members": [{"member_id": "M9", "birth_date": "1962-02-02", "gender": "M", "enrollment_months": 12}],
            "claims": diabetic("M9"),
            "pharmacy": [fill("M9", "Atorvastatin 40 MG", "2025-08-20", 90)],
        }),
    );

    assert!(result.in_denominator_final);
    assert!(result.in_numerator);
    assert_eq!(result.satisfying_modality.as_deref(), Some("statin"));
    assert_eq!(result.numerator_reason.as_deref(), Some("compliant_statin_2025-08-20"));
}

#[test]
fn test_diabetic_without_statin_is_gap() {
    let result = run_one(
        "SUPD",
        json!({
            "members": [{"member_id": "M10", "birth_date": "1955-02-02", "gender": "F", "enrollment_months": 12}],
            "claims": diabetic("M10"),
            "pharmacy": [fill("M10", "metformin 500mg", "2025-01-10", 90)],
        }),
    );

    assert!(result.in_denominator_final);
    assert!(!result.in_numerator);
    assert_eq!(result.gap_label().as_deref(), Some("no_statin_therapy"));
    // base 100 + age 20
    assert_eq!(result.priority_score, Some(120));
}

#[test]
fn test_pregnancy_excludes_from_statin_measure() {
    let mut claims = diabetic("M11");
    claims.push(claim("M11", "2025-05-05", "outpatient", Some("Z34.90"), None));
    let result = run_one(
        "SUPD",
        json!({
            "members": [{"member_id": "M11", "birth_date": "1983-02-02", "gender": "F", "enrollment_months": 12}],
            "claims": claims,
        }),
    );

    assert!(result.in_denominator);
    assert_eq!(result.exclusion_reason.as_deref(), Some("pregnancy"));
    assert!(!result.has_gap);
}
