//! Denominator eligibility
//!
//! Checks run in a fixed order and stop at the first failure, each failure
//! carrying its own reason code:
//!
//! 1. gender in the eligible set (`gender_not_eligible_<G>`)
//! 2. usable birth date (`birth_date_invalid`) and age at Dec 31 within range
//!    (`age_too_young_<n>`, `age_too_old_<n>`)
//! 3. continuous enrollment, when reported (`not_continuously_enrolled_<n>mo`)
//! 4. a qualifying encounter in the measurement year (`no_qualifying_encounter`)
//! 5. a condition diagnosis (`no_<condition>_diagnosis`)
//! 6. minimum fills of the target medication class (`insufficient_fills_<n>`)

use crate::context::MeasurementPeriod;
use crate::pdc::{class_fills, fills_within};
use log::trace;
use octofhir_measure_model::{MemberRecords, age_at};
use octofhir_measure_registry::{CombinationRule, DiagnosisRequirement, EvidenceSource, MeasureSpec};
use serde::Serialize;
use std::collections::BTreeSet;

/// Reason reported for members that pass every check
pub const ELIGIBLE: &str = "eligible";

/// Denominator decision for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: String,
    /// Age at Dec 31; `None` when the birth date is unusable
    pub age: Option<i32>,
}

impl Eligibility {
    fn pass(age: Option<i32>) -> Self {
        Self {
            eligible: true,
            reason: ELIGIBLE.to_string(),
            age,
        }
    }

    fn fail(reason: String, age: Option<i32>) -> Self {
        Self {
            eligible: false,
            reason,
            age,
        }
    }
}

/// Decide denominator membership
pub fn evaluate_eligibility(
    spec: &MeasureSpec,
    period: &MeasurementPeriod,
    records: &MemberRecords,
) -> Eligibility {
    let member = &records.member;

    if !spec.genders.contains(&member.gender) {
        let code = match member.gender.code() {
            "" => "unknown",
            code => code,
        };
        return Eligibility::fail(format!("gender_not_eligible_{}", code), None);
    }

    let Some(birth_date) = member.birth_date else {
        return Eligibility::fail("birth_date_invalid".to_string(), None);
    };
    let age = age_at(birth_date, period.anchor());
    if age < spec.age_min {
        return Eligibility::fail(format!("age_too_young_{}", age), Some(age));
    }
    if age > spec.age_max {
        return Eligibility::fail(format!("age_too_old_{}", age), Some(age));
    }

    // Missing enrollment data is not evidence of a break
    if let Some(months) = member.enrollment_months {
        if months < spec.enrollment_months {
            return Eligibility::fail(format!("not_continuously_enrolled_{}mo", months), Some(age));
        }
    }

    if let Some(encounter) = &spec.encounter {
        let has_encounter = records.claims.iter().any(|claim| {
            encounter.claim_types.contains(&claim.claim_type) && period.window().contains_opt(claim.service_date)
        });
        if !has_encounter {
            return Eligibility::fail("no_qualifying_encounter".to_string(), Some(age));
        }
    }

    if let Some(requirement) = &spec.diagnosis {
        if !has_condition(requirement, period, records) {
            return Eligibility::fail(format!("no_{}_diagnosis", requirement.condition), Some(age));
        }
    }

    if let CombinationRule::Threshold {
        medication,
        min_fills,
        ..
    } = &spec.rule
    {
        let fills = class_fills(&records.fills, medication);
        let in_year = fills_within(&fills, period.window());
        if in_year < *min_fills {
            return Eligibility::fail(format!("insufficient_fills_{}", in_year), Some(age));
        }
    }

    trace!("{} eligible for {} at age {}", member.member_id, spec.id, age);
    Eligibility::pass(Some(age))
}

/// Condition confirmed by enough ambulatory visits or one acute stay
///
/// Visits are counted on distinct service dates per setting.
fn has_condition(
    requirement: &DiagnosisRequirement,
    period: &MeasurementPeriod,
    records: &MemberRecords,
) -> bool {
    let window = period.lookback(requirement.lookback_years);
    let mut ambulatory = BTreeSet::new();
    let mut acute = BTreeSet::new();

    for claim in &records.claims {
        let Some(on) = claim.service_date else { continue };
        if !window.contains(on) || !EvidenceSource::Diagnosis.claim_matches(claim, &requirement.codes) {
            continue;
        }
        if claim.claim_type.is_ambulatory() {
            ambulatory.insert(on);
        } else if claim.claim_type.is_acute() {
            acute.insert(on);
        }
    }

    ambulatory.len() as u32 >= requirement.min_ambulatory || acute.len() as u32 >= requirement.min_acute
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{YEAR, date, diagnosis, fill, member, office_visit, spec};
    use octofhir_measure_model::{ClaimType, Gender, Member};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn period() -> MeasurementPeriod {
        MeasurementPeriod::new(YEAR).unwrap()
    }

    fn col_member(birth: chrono::NaiveDate) -> MemberRecords {
        let mut records = member("M1", birth, Gender::Female);
        records.claims.push(office_visit("M1", date(2025, 4, 2)));
        records
    }

    #[rstest]
    #[case(date(1980, 6, 15), false, "age_too_young_45")]
    #[case(date(1975, 12, 31), true, "eligible")]
    #[case(date(1950, 1, 1), true, "eligible")]
    #[case(date(1949, 12, 31), false, "age_too_old_76")]
    fn test_age_bounds(#[case] birth: chrono::NaiveDate, #[case] eligible: bool, #[case] reason: &str) {
        let result = evaluate_eligibility(&spec("COL"), &period(), &col_member(birth));
        assert_eq!(result.eligible, eligible);
        assert_eq!(result.reason, reason);
    }

    #[test]
    fn test_gender_checked_first() {
        let mut records = col_member(date(1990, 1, 1));
        records.member.gender = Gender::Male;
        let result = evaluate_eligibility(&spec("BCS"), &period(), &records);
        assert_eq!(result.reason, "gender_not_eligible_M");
        assert_eq!(result.age, None);
    }

    #[test]
    fn test_unknown_gender_reason() {
        let mut records = col_member(date(1960, 1, 1));
        records.member.gender = Gender::from("");
        let result = evaluate_eligibility(&spec("COL"), &period(), &records);
        assert_eq!(result.reason, "gender_not_eligible_unknown");
    }

    #[test]
    fn test_invalid_birth_date() {
        let mut records = col_member(date(1960, 1, 1));
        records.member = Member::new("M1", None, Gender::Female);
        let result = evaluate_eligibility(&spec("COL"), &period(), &records);
        assert_eq!(result.reason, "birth_date_invalid");
    }

    #[test]
    fn test_enrollment_gap() {
        let mut records = col_member(date(1960, 1, 1));
        records.member.enrollment_months = Some(10);
        let result = evaluate_eligibility(&spec("COL"), &period(), &records);
        assert_eq!(result.reason, "not_continuously_enrolled_10mo");
        assert_eq!(result.age, Some(65));
    }

    #[test]
    fn test_missing_enrollment_is_satisfied() {
        let mut records = col_member(date(1960, 1, 1));
        records.member.enrollment_months = None;
        assert!(evaluate_eligibility(&spec("COL"), &period(), &records).eligible);
    }

    #[test]
    fn test_encounter_must_be_in_year() {
        let mut records = member("M1", date(1960, 1, 1), Gender::Female);
        records.claims.push(office_visit("M1", date(2024, 11, 1)));
        records.claims.push(diagnosis("M1", date(2025, 3, 1), "I10", ClaimType::Inpatient));
        let result = evaluate_eligibility(&spec("COL"), &period(), &records);
        assert_eq!(result.reason, "no_qualifying_encounter");
    }

    #[rstest]
    #[case(vec![(date(2025, 2, 1), ClaimType::Outpatient)], false)]
    #[case(vec![(date(2025, 2, 1), ClaimType::Outpatient), (date(2025, 2, 1), ClaimType::Professional)], false)]
    #[case(vec![(date(2024, 2, 1), ClaimType::Outpatient), (date(2025, 5, 1), ClaimType::Professional)], true)]
    #[case(vec![(date(2025, 8, 9), ClaimType::Emergency)], true)]
    #[case(vec![(date(2023, 8, 9), ClaimType::Inpatient)], false)]
    fn test_diabetes_requirement(#[case] visits: Vec<(chrono::NaiveDate, ClaimType)>, #[case] eligible: bool) {
        let mut records = member("M1", date(1970, 1, 1), Gender::Male);
        for (on, claim_type) in visits {
            records.claims.push(diagnosis("M1", on, "E11.9", claim_type));
        }
        let result = evaluate_eligibility(&spec("KED"), &period(), &records);
        assert_eq!(result.eligible, eligible);
        if !eligible {
            assert_eq!(result.reason, "no_diabetes_diagnosis");
        }
    }

    #[test]
    fn test_minimum_fills() {
        let mut records = member("M1", date(1960, 1, 1), Gender::Female);
        records.fills.push(fill("M1", "lisinopril 10mg", date(2025, 3, 1), 30));
        records.fills.push(fill("M1", "lisinopril 10mg", date(2024, 12, 1), 30));
        let result = evaluate_eligibility(&spec("PDC-RASA"), &period(), &records);
        assert_eq!(result.reason, "insufficient_fills_1");

        records.fills.push(fill("M1", "LISINOPRIL", date(2025, 4, 1), 30));
        assert!(evaluate_eligibility(&spec("PDC-RASA"), &period(), &records).eligible);
    }
}
