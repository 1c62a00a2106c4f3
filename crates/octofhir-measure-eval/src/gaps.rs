//! Gap classification and outreach priority
//!
//! Scores come from the measure's [`PriorityTable`]; nothing here hardcodes
//! a measure-specific number.

use crate::numerator::NumeratorOutcome;
use log::trace;
use octofhir_measure_model::MemberRecords;
use octofhir_measure_registry::{
    CombinationRule, EvidenceSource, MeasureSpec, PriorityLevel, PriorityTable,
};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// Why a final-denominator member is not compliant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapType {
    /// No evidence at any time
    NeverPerformed { label: String },
    /// Evidence exists but only before the modality's window
    Overdue { modality: String },
    /// ALL-of requirements not met in the measurement year
    Missing {
        modalities: SmallVec<[String; 2]>,
        /// Every requirement is missing
        all: bool,
        label: String,
    },
    /// Adherence below the threshold
    BelowThreshold,
}

impl GapType {
    pub fn label(&self) -> String {
        match self {
            GapType::NeverPerformed { label } => label.clone(),
            GapType::Overdue { modality } => format!("overdue_{}", modality),
            GapType::Missing { label, .. } => label.clone(),
            GapType::BelowThreshold => "pdc_below_threshold".to_string(),
        }
    }
}

impl Serialize for GapType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Outreach ranking for one gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Priority {
    pub score: i32,
    pub level: PriorityLevel,
    pub action: String,
}

/// Label a numerator failure; `None` for compliant members
pub fn classify_gap(spec: &MeasureSpec, outcome: &NumeratorOutcome) -> Option<GapType> {
    if outcome.compliant {
        return None;
    }
    let never = || GapType::NeverPerformed {
        label: spec.gaps.never_label.clone(),
    };

    let gap = match &spec.rule {
        CombinationRule::AnyOf => outcome
            .evidence
            .iter()
            .find(|e| e.lapsed())
            .map(|e| GapType::Overdue {
                modality: e.modality.clone(),
            })
            .unwrap_or_else(never),
        CombinationRule::AllOf => {
            let modalities: SmallVec<[String; 2]> = outcome
                .evidence
                .iter()
                .filter(|e| !e.satisfied())
                .map(|e| e.modality.clone())
                .collect();
            let all = modalities.len() == outcome.evidence.len();
            let label = if all {
                spec.gaps.never_label.clone()
            } else {
                format!("missing_{}", modalities.join("_"))
            };
            GapType::Missing {
                modalities,
                all,
                label,
            }
        }
        CombinationRule::Threshold { .. } => {
            if outcome.pdc.is_some_and(|p| p.days_covered > 0) || outcome.fill_count.unwrap_or(0) > 0 {
                GapType::BelowThreshold
            } else {
                never()
            }
        }
    };
    Some(gap)
}

fn modality_label<'a>(spec: &'a MeasureSpec, id: &'a str) -> &'a str {
    spec.modality(id).map(|m| m.label.as_str()).unwrap_or(id)
}

/// Score a gap and pick the outreach action
pub fn prioritize(
    spec: &MeasureSpec,
    gap: &GapType,
    outcome: &NumeratorOutcome,
    age: Option<i32>,
    records: &MemberRecords,
) -> Priority {
    let table = &spec.gaps.priority;
    let actions = &spec.gaps.actions;
    let mut score = table.base;

    if let (Some(threshold), Some(age)) = (table.age_threshold, age) {
        if age >= threshold {
            score += table.age_bonus;
        }
    }

    let action = match gap {
        GapType::NeverPerformed { .. } => {
            score += table.never_performed_bonus;
            actions.never_performed.clone()
        }
        GapType::Overdue { modality } => {
            score += table.overdue_bonus;
            actions
                .overdue
                .replace("{modality}", modality_label(spec, modality))
        }
        GapType::Missing { modalities, all, .. } => {
            score += if *all {
                table.missing_all_bonus
            } else {
                table.missing_one_bonus
            };
            let labels: Vec<&str> = modalities.iter().map(|m| modality_label(spec, m)).collect();
            actions.missing.replace("{missing}", &labels.join(" and "))
        }
        GapType::BelowThreshold => {
            score += adherence_bonus(table, spec, outcome);
            actions.below_threshold.clone()
        }
    };

    score += comorbidity_bonus(table, records);

    trace!("{} {} gap scored {}", records.member_id(), gap.label(), score);
    Priority {
        score,
        level: table.level(score),
        action,
    }
}

fn adherence_bonus(table: &PriorityTable, spec: &MeasureSpec, outcome: &NumeratorOutcome) -> i32 {
    let mut bonus = 0;
    if let (Some(below), Some(pdc)) = (table.severe_pdc_below, outcome.pdc) {
        if pdc.pdc < below {
            bonus += table.severe_pdc_bonus;
        }
    }
    if let CombinationRule::Threshold { min_fills, .. } = &spec.rule {
        if outcome.fill_count == Some(*min_fills) {
            bonus += table.min_fill_bonus;
        }
    }
    bonus
}

/// Comorbidities are taken from the full claim history
fn comorbidity_bonus(table: &PriorityTable, records: &MemberRecords) -> i32 {
    table
        .comorbidities
        .iter()
        .filter(|c| {
            records
                .claims
                .iter()
                .any(|claim| EvidenceSource::Diagnosis.claim_matches(claim, &c.codes))
        })
        .map(|c| c.bonus)
        .sum()
}
