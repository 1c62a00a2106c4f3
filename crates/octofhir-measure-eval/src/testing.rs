//! Shared fixtures for unit tests

use chrono::NaiveDate;
use octofhir_measure_model::{ClaimEvent, ClaimType, Gender, LabResult, Member, MemberRecords, PharmacyFill};
use octofhir_measure_registry::{CodeSetRegistry, MeasureSpec};
use std::sync::Arc;

pub(crate) const YEAR: i32 = 2025;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn spec(id: &str) -> Arc<MeasureSpec> {
    CodeSetRegistry::builtin().unwrap().get(id).unwrap()
}

/// Member with enough history to pass every eligibility check except
/// those under test
pub(crate) fn member(id: &str, birth: NaiveDate, gender: Gender) -> MemberRecords {
    MemberRecords::new(Member::new(id, Some(birth), gender).with_enrollment(12))
}

pub(crate) fn office_visit(id: &str, on: NaiveDate) -> ClaimEvent {
    ClaimEvent::new(id, Some(on), ClaimType::Outpatient).with_procedure("99213")
}

pub(crate) fn procedure(id: &str, on: NaiveDate, code: &str) -> ClaimEvent {
    ClaimEvent::new(id, Some(on), ClaimType::Outpatient).with_procedure(code)
}

pub(crate) fn diagnosis(id: &str, on: NaiveDate, code: &str, claim_type: ClaimType) -> ClaimEvent {
    ClaimEvent::new(id, Some(on), claim_type).with_diagnosis(code)
}

pub(crate) fn lab(id: &str, on: NaiveDate, code: &str) -> LabResult {
    LabResult::new(id, Some(on), code)
}

pub(crate) fn fill(id: &str, drug: &str, on: NaiveDate, supply: i64) -> PharmacyFill {
    PharmacyFill::new(id, drug, Some(on), Some(supply))
}
