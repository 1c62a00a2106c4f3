//! Per-member, per-measure output row

use crate::eligibility::Eligibility;
use crate::error::{EvalError, EvalResult};
use crate::exclusion::Exclusion;
use crate::gaps::{GapType, Priority};
use crate::numerator::NumeratorOutcome;
use chrono::NaiveDate;
use octofhir_measure_registry::PriorityLevel;
use serde::Serialize;

/// Outcome of one member against one measure
///
/// Stage fields are filled in pipeline order. A member that fails a stage
/// carries defaults for every later stage, so `in_numerator` implies
/// `in_denominator_final`, which implies `in_denominator && !excluded`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberMeasureResult {
    pub member_id: String,
    pub measure_id: String,
    pub measurement_year: i32,
    pub age: Option<i32>,

    pub in_denominator: bool,
    pub denominator_reason: String,

    pub excluded: bool,
    pub exclusion_reason: Option<String>,
    pub in_denominator_final: bool,

    pub in_numerator: bool,
    pub numerator_reason: Option<String>,
    pub satisfying_modality: Option<String>,
    pub evidence_date: Option<NaiveDate>,

    pub pdc: Option<f64>,
    pub days_covered: Option<u32>,
    pub total_days: Option<u32>,
    pub fill_count: Option<u32>,

    pub has_gap: bool,
    pub gap_type: Option<GapType>,
    pub priority_score: Option<i32>,
    pub priority_level: Option<PriorityLevel>,
    pub recommended_action: Option<String>,
}

impl MemberMeasureResult {
    pub(crate) fn new(member_id: &str, measure_id: &str, year: i32, eligibility: Eligibility) -> Self {
        Self {
            member_id: member_id.to_string(),
            measure_id: measure_id.to_string(),
            measurement_year: year,
            age: eligibility.age,
            in_denominator: eligibility.eligible,
            denominator_reason: eligibility.reason,
            excluded: false,
            exclusion_reason: None,
            in_denominator_final: false,
            in_numerator: false,
            numerator_reason: None,
            satisfying_modality: None,
            evidence_date: None,
            pdc: None,
            days_covered: None,
            total_days: None,
            fill_count: None,
            has_gap: false,
            gap_type: None,
            priority_score: None,
            priority_level: None,
            recommended_action: None,
        }
    }

    pub(crate) fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.excluded = exclusion.excluded;
        self.exclusion_reason = exclusion.reason;
        self.in_denominator_final = self.in_denominator && !self.excluded;
        self
    }

    pub(crate) fn with_numerator(mut self, outcome: NumeratorOutcome) -> Self {
        self.in_numerator = outcome.compliant;
        self.numerator_reason = Some(outcome.reason);
        self.satisfying_modality = outcome.modality;
        self.evidence_date = outcome.evidence_date;
        if let Some(pdc) = outcome.pdc {
            self.pdc = Some(pdc.pdc);
            self.days_covered = Some(pdc.days_covered);
            self.total_days = Some(pdc.total_days);
        }
        self.fill_count = outcome.fill_count;
        self
    }

    pub(crate) fn with_gap(mut self, gap: GapType, priority: Priority) -> Self {
        self.has_gap = true;
        self.gap_type = Some(gap);
        self.priority_score = Some(priority.score);
        self.priority_level = Some(priority.level);
        self.recommended_action = Some(priority.action);
        self
    }

    /// Gap label, when the member has a gap
    pub fn gap_label(&self) -> Option<String> {
        self.gap_type.as_ref().map(GapType::label)
    }

    /// Check that stage flags nest
    pub fn check_invariants(&self) -> EvalResult<()> {
        let fail = |message: &str| Err(EvalError::invariant(self.member_id.clone(), message));
        if self.in_denominator_final != (self.in_denominator && !self.excluded) {
            return fail("final denominator disagrees with eligibility and exclusion");
        }
        if self.in_numerator && !self.in_denominator_final {
            return fail("numerator member outside the final denominator");
        }
        if self.has_gap != (self.in_denominator_final && !self.in_numerator) {
            return fail("gap flag disagrees with numerator outcome");
        }
        Ok(())
    }
}
