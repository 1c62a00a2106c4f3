//! Population roll-up
//!
//! Pure tabulation over member results. A [`PopulationTally`] can be built
//! from any partition of the results and merged back together in any order
//! with identical outcome.

use crate::result::MemberMeasureResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running counts over member results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationTally {
    pub total: u64,
    pub denominator: u64,
    pub excluded: u64,
    pub final_denominator: u64,
    pub numerator: u64,
    pub gaps: u64,
    pub gap_types: BTreeMap<String, u64>,
    pub exclusion_reasons: BTreeMap<String, u64>,
    pub ineligible_reasons: BTreeMap<String, u64>,
    pub modalities: BTreeMap<String, u64>,
    pub priority_levels: BTreeMap<String, u64>,
    pub pdc_members: u64,
    pub days_covered: u64,
    pub pdc_total_days: u64,
}

fn bump(map: &mut BTreeMap<String, u64>, key: &str) {
    *map.entry(key.to_string()).or_default() += 1;
}

fn combine(into: &mut BTreeMap<String, u64>, from: BTreeMap<String, u64>) {
    for (key, count) in from {
        *into.entry(key).or_default() += count;
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl PopulationTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a MemberMeasureResult>) -> Self {
        let mut tally = Self::new();
        for result in results {
            tally.add(result);
        }
        tally
    }

    pub fn add(&mut self, result: &MemberMeasureResult) {
        self.total += 1;
        if !result.in_denominator {
            bump(&mut self.ineligible_reasons, &result.denominator_reason);
            return;
        }
        self.denominator += 1;

        if result.excluded {
            self.excluded += 1;
            if let Some(reason) = &result.exclusion_reason {
                bump(&mut self.exclusion_reasons, reason);
            }
        }
        if !result.in_denominator_final {
            return;
        }
        self.final_denominator += 1;

        if result.in_numerator {
            self.numerator += 1;
            if let Some(modality) = &result.satisfying_modality {
                bump(&mut self.modalities, modality);
            }
        }
        if let (Some(covered), Some(total)) = (result.days_covered, result.total_days) {
            self.pdc_members += 1;
            self.days_covered += u64::from(covered);
            self.pdc_total_days += u64::from(total);
        }
        if result.has_gap {
            self.gaps += 1;
            if let Some(label) = result.gap_label() {
                bump(&mut self.gap_types, &label);
            }
            if let Some(level) = result.priority_level {
                bump(&mut self.priority_levels, &level.to_string());
            }
        }
    }

    /// Combine two partial tallies
    pub fn merge(mut self, other: Self) -> Self {
        self.total += other.total;
        self.denominator += other.denominator;
        self.excluded += other.excluded;
        self.final_denominator += other.final_denominator;
        self.numerator += other.numerator;
        self.gaps += other.gaps;
        combine(&mut self.gap_types, other.gap_types);
        combine(&mut self.exclusion_reasons, other.exclusion_reasons);
        combine(&mut self.ineligible_reasons, other.ineligible_reasons);
        combine(&mut self.modalities, other.modalities);
        combine(&mut self.priority_levels, other.priority_levels);
        self.pdc_members += other.pdc_members;
        self.days_covered += other.days_covered;
        self.pdc_total_days += other.pdc_total_days;
        self
    }

    pub fn summarize(&self, measure_id: &str, measurement_year: i32) -> PopulationSummary {
        PopulationSummary {
            measure_id: measure_id.to_string(),
            measurement_year,
            total_population: self.total,
            denominator: self.denominator,
            excluded: self.excluded,
            final_denominator: self.final_denominator,
            numerator: self.numerator,
            rate: percent(self.numerator, self.final_denominator),
            gap_count: self.gaps,
            gap_rate: percent(self.gaps, self.final_denominator),
            gap_types: self.gap_types.clone(),
            exclusion_reasons: self.exclusion_reasons.clone(),
            ineligible_reasons: self.ineligible_reasons.clone(),
            modalities: self.modalities.clone(),
            priority_levels: self.priority_levels.clone(),
            average_pdc: (self.pdc_members > 0).then(|| percent(self.days_covered, self.pdc_total_days)),
        }
    }
}

/// Measure-level statistics for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationSummary {
    pub measure_id: String,
    pub measurement_year: i32,
    pub total_population: u64,
    /// Eligible before exclusions
    pub denominator: u64,
    pub excluded: u64,
    pub final_denominator: u64,
    pub numerator: u64,
    /// `numerator / final_denominator * 100`, zero for an empty denominator
    pub rate: f64,
    pub gap_count: u64,
    pub gap_rate: f64,
    pub gap_types: BTreeMap<String, u64>,
    pub exclusion_reasons: BTreeMap<String, u64>,
    pub ineligible_reasons: BTreeMap<String, u64>,
    pub modalities: BTreeMap<String, u64>,
    pub priority_levels: BTreeMap<String, u64>,
    /// Pooled coverage over members with a PDC
    pub average_pdc: Option<f64>,
}
