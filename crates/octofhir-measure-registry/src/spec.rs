//! Declarative measure specification

use crate::codes::CodeSet;
use crate::medication::MedicationClass;
use crate::priority::GapPolicy;
use octofhir_measure_diagnostics::{
    MQ0101, MQ0102, MQ0103, MQ0104, MQ0105, MQ0106, MQ0110, MQ0111, MQ0112, MeasureError,
    Result,
};
use octofhir_measure_model::{ClaimType, ClaimEvent, Gender};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default continuous-enrollment threshold (full year)
pub const DEFAULT_ENROLLMENT_MONTHS: u32 = 12;
/// Default adherence threshold
pub const DEFAULT_THRESHOLD_PCT: f64 = 80.0;
/// Default minimum qualifying fills for adherence measures
pub const DEFAULT_MIN_FILLS: u32 = 2;

/// Which record field carries evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Claim procedure code
    Procedure,
    /// Claim diagnosis code
    Diagnosis,
    /// Either claim code
    #[default]
    Claim,
    /// Lab test code
    Lab,
    /// Pharmacy fill whose medication name falls in the modality's class
    Pharmacy,
}

impl EvidenceSource {
    /// Does the claim carry a code from the set in the relevant field
    pub fn claim_matches(&self, claim: &ClaimEvent, codes: &CodeSet) -> bool {
        match self {
            EvidenceSource::Procedure => codes.matches(claim.procedure_code.as_deref()),
            EvidenceSource::Diagnosis => codes.matches(claim.diagnosis_code.as_deref()),
            EvidenceSource::Claim => {
                codes.matches(claim.procedure_code.as_deref())
                    || codes.matches(claim.diagnosis_code.as_deref())
            }
            EvidenceSource::Lab | EvidenceSource::Pharmacy => false,
        }
    }

    /// Sources that read claim codes
    pub fn is_claim_source(&self) -> bool {
        !matches!(self, EvidenceSource::Lab | EvidenceSource::Pharmacy)
    }
}

/// Applicability window of an exclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionWindow {
    /// Anywhere in claim history, dated or not
    Ever,
    /// Dated inside the measurement year
    MeasurementYear,
}

/// One exclusion condition; rules are checked in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Reason reported when the rule matches
    pub reason: String,
    pub codes: CodeSet,
    pub window: ExclusionWindow,
    #[serde(default)]
    pub source: EvidenceSource,
}

/// Encounter requirement for the denominator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRequirement {
    pub claim_types: Vec<ClaimType>,
}

/// Condition diagnosis requirement for the denominator
///
/// Satisfied by `min_ambulatory` outpatient/professional claims or
/// `min_acute` inpatient/emergency claims carrying a condition code between
/// Jan 1 of `year - lookback_years` and Dec 31 of the measurement year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRequirement {
    pub condition: String,
    pub codes: CodeSet,
    #[serde(default = "default_diagnosis_lookback")]
    pub lookback_years: u32,
    #[serde(default = "default_min_ambulatory")]
    pub min_ambulatory: u32,
    #[serde(default = "default_min_acute")]
    pub min_acute: u32,
}

fn default_diagnosis_lookback() -> u32 {
    1
}

fn default_min_ambulatory() -> u32 {
    2
}

fn default_min_acute() -> u32 {
    1
}

/// One way of satisfying the numerator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modality {
    pub id: String,
    pub label: String,
    pub source: EvidenceSource,
    #[serde(default)]
    pub codes: CodeSet,
    /// Medication class for pharmacy modalities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<MedicationClass>,
    /// Years before the measurement year the window reaches back
    #[serde(default)]
    pub lookback_years: u32,
}

/// How modalities combine into numerator compliance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombinationRule {
    /// Any modality within its own window
    AnyOf,
    /// Every modality within the measurement year
    AllOf,
    /// Proportion of days covered at or above a threshold
    Threshold {
        medication: MedicationClass,
        #[serde(default = "default_threshold_pct")]
        threshold_pct: f64,
        #[serde(default = "default_min_fills")]
        min_fills: u32,
    },
}

fn default_threshold_pct() -> f64 {
    DEFAULT_THRESHOLD_PCT
}

fn default_min_fills() -> u32 {
    DEFAULT_MIN_FILLS
}

fn default_enrollment_months() -> u32 {
    DEFAULT_ENROLLMENT_MONTHS
}

/// A quality measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub age_min: i32,
    pub age_max: i32,
    pub genders: Vec<Gender>,
    #[serde(default = "default_enrollment_months")]
    pub enrollment_months: u32,
    #[serde(default)]
    pub encounter: Option<EncounterRequirement>,
    #[serde(default)]
    pub diagnosis: Option<DiagnosisRequirement>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
    #[serde(default)]
    pub modalities: Vec<Modality>,
    pub rule: CombinationRule,
    #[serde(default)]
    pub gaps: GapPolicy,
}

impl MeasureSpec {
    /// Adherence measures are scored by PDC
    pub fn is_adherence(&self) -> bool {
        matches!(self.rule, CombinationRule::Threshold { .. })
    }

    pub fn modality(&self, id: &str) -> Option<&Modality> {
        self.modalities.iter().find(|m| m.id == id)
    }

    /// Check internal consistency
    ///
    /// All problems are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let mut fail = |code, message: String| {
            errors.push(MeasureError::configuration_for(code, self.id.clone(), message));
        };

        if self.age_min < 0 || self.age_min > self.age_max {
            fail(
                MQ0101,
                format!("invalid age range [{}, {}]", self.age_min, self.age_max),
            );
        }
        if self.genders.is_empty() {
            fail(MQ0105, "no eligible genders".to_string());
        }

        match &self.rule {
            CombinationRule::AnyOf | CombinationRule::AllOf if self.modalities.is_empty() => {
                fail(MQ0102, "combination rule needs at least one modality".to_string());
            }
            CombinationRule::Threshold {
                medication,
                threshold_pct,
                ..
            } => {
                if !(*threshold_pct > 0.0 && *threshold_pct <= 100.0) {
                    fail(
                        MQ0104,
                        format!("threshold {} outside (0, 100]", threshold_pct),
                    );
                }
                if medication.fragments().is_empty() {
                    fail(MQ0106, format!("medication class '{}' is empty", medication.id()));
                }
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for modality in &self.modalities {
            if !seen.insert(modality.id.as_str()) {
                fail(MQ0103, format!("duplicate modality '{}'", modality.id));
            }
            if modality.source == EvidenceSource::Pharmacy && modality.medication.is_none() {
                fail(
                    MQ0112,
                    format!("pharmacy modality '{}' has no medication class", modality.id),
                );
            }
        }

        for rule in &self.exclusions {
            if !rule.source.is_claim_source() {
                fail(
                    MQ0111,
                    format!(
                        "exclusion '{}' uses source {:?}; exclusions match claim codes only",
                        rule.reason, rule.source
                    ),
                );
            }
        }

        let priority = &self.gaps.priority;
        if priority.high_at < priority.medium_at {
            fail(
                MQ0110,
                format!(
                    "high band {} below medium band {}",
                    priority.high_at, priority.medium_at
                ),
            );
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(MeasureError::Multiple(errors)),
        }
    }
}
