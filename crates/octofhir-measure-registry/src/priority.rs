//! Gap policy: labels, priority scoring table and outreach actions

use crate::codes::CodeSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outreach urgency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityLevel::Low => write!(f, "LOW"),
            PriorityLevel::Medium => write!(f, "MEDIUM"),
            PriorityLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Bonus awarded when a member has a comorbid condition on record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComorbidityBonus {
    pub condition: String,
    pub codes: CodeSet,
    pub bonus: i32,
}

/// Additive priority scoring table
///
/// Every term is independent; a gap's score is the sum of the terms that
/// apply. Zero-valued terms are inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityTable {
    /// Score for any gap
    pub base: i32,
    /// Age at year end at or above which `age_bonus` applies
    pub age_threshold: Option<i32>,
    pub age_bonus: i32,
    pub never_performed_bonus: i32,
    pub overdue_bonus: i32,
    /// Every required modality missing
    pub missing_all_bonus: i32,
    /// Some but not all required modalities missing
    pub missing_one_bonus: i32,
    /// PDC strictly below this value earns `severe_pdc_bonus`
    pub severe_pdc_below: Option<f64>,
    pub severe_pdc_bonus: i32,
    /// Member has exactly the minimum number of qualifying fills
    pub min_fill_bonus: i32,
    pub comorbidities: Vec<ComorbidityBonus>,
    pub high_at: i32,
    pub medium_at: i32,
}

impl PriorityTable {
    /// Band a score
    pub fn level(&self, score: i32) -> PriorityLevel {
        if score >= self.high_at {
            PriorityLevel::High
        } else if score >= self.medium_at {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

/// Recommended outreach per gap type
///
/// `{modality}` is replaced with the lapsed modality label and `{missing}`
/// with the missing modality labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapActions {
    pub never_performed: String,
    pub overdue: String,
    pub missing: String,
    pub below_threshold: String,
}

impl Default for GapActions {
    fn default() -> Self {
        Self {
            never_performed: "Schedule initial screening".to_string(),
            overdue: "Schedule repeat {modality}".to_string(),
            missing: "Order {missing}".to_string(),
            below_threshold: "Pharmacist adherence outreach".to_string(),
        }
    }
}

/// How non-compliant members are labelled, scored and routed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapPolicy {
    /// Gap-type label for members with no evidence at all
    pub never_label: String,
    pub priority: PriorityTable,
    pub actions: GapActions,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self {
            never_label: "never_performed".to_string(),
            priority: PriorityTable::default(),
            actions: GapActions::default(),
        }
    }
}
