//! Typed input records
//!
//! Records are read-only snapshots for one measurement-year run. Codes are
//! normalized at construction and unparseable dates are kept as `None`, so
//! evaluators never see raw text they would have to reinterpret.

use crate::code::normalize_code;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days of supply assumed when a fill does not report one
pub const DEFAULT_DAYS_SUPPLY: i64 = 30;

/// Administrative gender
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Female,
    Male,
    Unknown(String),
}

impl Gender {
    /// Short code used in reason strings
    pub fn code(&self) -> &str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Gender::Unknown(_))
    }
}

impl From<&str> for Gender {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "F" | "FEMALE" | "W" | "WOMAN" => Gender::Female,
            "M" | "MALE" | "MAN" => Gender::Male,
            _ => Gender::Unknown(raw.trim().to_string()),
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        Gender::from(raw.as_str())
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.code().to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Claim setting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClaimType {
    Outpatient,
    Inpatient,
    Emergency,
    Professional,
    Other(String),
}

impl ClaimType {
    pub fn name(&self) -> &str {
        match self {
            ClaimType::Outpatient => "outpatient",
            ClaimType::Inpatient => "inpatient",
            ClaimType::Emergency => "emergency",
            ClaimType::Professional => "professional",
            ClaimType::Other(raw) => raw,
        }
    }

    /// Outpatient or professional visit
    pub fn is_ambulatory(&self) -> bool {
        matches!(self, ClaimType::Outpatient | ClaimType::Professional)
    }

    /// Inpatient stay or emergency visit
    pub fn is_acute(&self) -> bool {
        matches!(self, ClaimType::Inpatient | ClaimType::Emergency)
    }
}

impl From<&str> for ClaimType {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "outpatient" | "op" | "office" => ClaimType::Outpatient,
            "inpatient" | "ip" => ClaimType::Inpatient,
            "emergency" | "ed" | "er" => ClaimType::Emergency,
            "professional" | "prof" => ClaimType::Professional,
            _ => ClaimType::Other(raw.trim().to_string()),
        }
    }
}

impl From<String> for ClaimType {
    fn from(raw: String) -> Self {
        ClaimType::from(raw.as_str())
    }
}

impl From<ClaimType> for String {
    fn from(claim_type: ClaimType) -> Self {
        claim_type.name().to_string()
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Member demographics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: String,
    /// `None` when absent or unparseable
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    /// Continuous-enrollment months; `None` when not reported
    pub enrollment_months: Option<u32>,
}

impl Member {
    pub fn new(member_id: impl Into<String>, birth_date: Option<NaiveDate>, gender: Gender) -> Self {
        Self {
            member_id: member_id.into(),
            birth_date,
            gender,
            enrollment_months: None,
        }
    }

    pub fn with_enrollment(mut self, months: u32) -> Self {
        self.enrollment_months = Some(months);
        self
    }
}

/// A medical claim line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub member_id: String,
    pub diagnosis_code: Option<String>,
    pub procedure_code: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub claim_type: ClaimType,
    pub provider_specialty: Option<String>,
}

impl ClaimEvent {
    pub fn new(member_id: impl Into<String>, service_date: Option<NaiveDate>, claim_type: ClaimType) -> Self {
        Self {
            member_id: member_id.into(),
            diagnosis_code: None,
            procedure_code: None,
            service_date,
            claim_type,
            provider_specialty: None,
        }
    }

    pub fn with_diagnosis(mut self, code: &str) -> Self {
        self.diagnosis_code = normalize_code(code);
        self
    }

    pub fn with_procedure(mut self, code: &str) -> Self {
        self.procedure_code = normalize_code(code);
        self
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.provider_specialty = Some(specialty.into());
        self
    }
}

/// A pharmacy dispensing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyFill {
    pub member_id: String,
    /// Free text, matched against medication class lexicons
    pub medication_name: String,
    pub fill_date: Option<NaiveDate>,
    /// Reported days supply; `None` when absent or unparseable
    pub days_supply: Option<i64>,
}

impl PharmacyFill {
    pub fn new(
        member_id: impl Into<String>,
        medication_name: impl Into<String>,
        fill_date: Option<NaiveDate>,
        days_supply: Option<i64>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            medication_name: medication_name.into(),
            fill_date,
            days_supply,
        }
    }

    /// Days supply used for coverage
    ///
    /// Absent supplies fall back to [`DEFAULT_DAYS_SUPPLY`]. A reported zero or
    /// negative supply stays as is and yields zero-length coverage.
    pub fn effective_days_supply(&self) -> i64 {
        self.days_supply.unwrap_or(DEFAULT_DAYS_SUPPLY)
    }

    /// Inclusive `[fill_date, fill_date + supply - 1]`, or `None` when the
    /// fill has no date or no coverage
    ///
    /// Supplies reaching past the calendar saturate at [`NaiveDate::MAX`].
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.fill_date?;
        let supply = self.effective_days_supply();
        if supply <= 0 {
            return None;
        }
        let end = start
            .checked_add_days(Days::new((supply - 1) as u64))
            .unwrap_or(NaiveDate::MAX);
        Some((start, end))
    }
}

/// A laboratory result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub member_id: String,
    pub test_date: Option<NaiveDate>,
    pub test_code: Option<String>,
    pub result_value: Option<String>,
}

impl LabResult {
    pub fn new(member_id: impl Into<String>, test_date: Option<NaiveDate>, test_code: &str) -> Self {
        Self {
            member_id: member_id.into(),
            test_date,
            test_code: normalize_code(test_code),
            result_value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.result_value = Some(value.into());
        self
    }
}
