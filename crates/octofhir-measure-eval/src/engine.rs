//! Measure engine: runs the member pipeline over a population

use crate::aggregate::{PopulationSummary, PopulationTally};
use crate::context::MeasurementPeriod;
use crate::eligibility::evaluate_eligibility;
use crate::error::EvalResult;
use crate::exclusion::evaluate_exclusions;
use crate::gaps::{classify_gap, prioritize};
use crate::numerator::evaluate_numerator;
use crate::result::MemberMeasureResult;
use log::{debug, info};
use octofhir_measure_diagnostics::{Diagnostic, Result};
use octofhir_measure_model::{Dataset, MemberRecords};
use octofhir_measure_registry::{CodeSetRegistry, MeasureSpec};
use serde::Serialize;
use std::sync::Arc;

/// A validated measure bound to a measurement year
#[derive(Debug, Clone)]
pub struct MeasureEngine {
    spec: Arc<MeasureSpec>,
    period: MeasurementPeriod,
}

impl MeasureEngine {
    pub fn new(spec: Arc<MeasureSpec>, year: i32) -> EvalResult<Self> {
        spec.validate()?;
        let period = MeasurementPeriod::new(year)?;
        Ok(Self { spec, period })
    }

    /// Look up a measure and bind it to a year
    pub fn from_registry(registry: &CodeSetRegistry, measure_id: &str, year: i32) -> Result<Self> {
        let spec = registry.get(measure_id)?;
        Ok(Self::new(spec, year)?)
    }

    pub fn spec(&self) -> &MeasureSpec {
        &self.spec
    }

    pub fn period(&self) -> &MeasurementPeriod {
        &self.period
    }

    /// Run one member through eligibility, exclusion, numerator and gaps
    pub fn evaluate_member(&self, records: &MemberRecords) -> EvalResult<MemberMeasureResult> {
        let spec = self.spec.as_ref();
        let eligibility = evaluate_eligibility(spec, &self.period, records);
        let age = eligibility.age;
        let mut result = MemberMeasureResult::new(records.member_id(), &spec.id, self.period.year, eligibility);

        if result.in_denominator {
            let exclusion = evaluate_exclusions(&spec.exclusions, &self.period, &records.claims);
            result = result.with_exclusion(exclusion);
        }

        if result.in_denominator_final {
            let outcome = evaluate_numerator(spec, &self.period, records);
            let gap = classify_gap(spec, &outcome);
            let priority = gap
                .as_ref()
                .map(|gap| prioritize(spec, gap, &outcome, age, records));
            result = result.with_numerator(outcome);
            if let (Some(gap), Some(priority)) = (gap, priority) {
                result = result.with_gap(gap, priority);
            }
        }

        result.check_invariants()?;
        Ok(result)
    }

    /// Evaluate every member of a dataset
    pub fn evaluate_population(&self, dataset: &Dataset) -> EvalResult<MeasureRun> {
        debug!(
            "evaluating {} for {} members in {}",
            self.spec.id,
            dataset.len(),
            self.period.year
        );
        let (results, tally) = self.evaluate_all(dataset.records())?;
        let summary = tally.summarize(&self.spec.id, self.period.year);

        info!(
            "{} {}: {}/{} compliant ({:.1}%), {} gaps, {} excluded",
            summary.measure_id,
            summary.measurement_year,
            summary.numerator,
            summary.final_denominator,
            summary.rate,
            summary.gap_count,
            summary.excluded
        );

        Ok(MeasureRun {
            measure_id: self.spec.id.clone(),
            measurement_year: self.period.year,
            results,
            summary,
            diagnostics: dataset.diagnostics().to_vec(),
        })
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, records: &[MemberRecords]) -> EvalResult<(Vec<MemberMeasureResult>, PopulationTally)> {
        use rayon::prelude::*;

        let results = records
            .par_iter()
            .map(|r| self.evaluate_member(r))
            .collect::<EvalResult<Vec<_>>>()?;
        let tally = results
            .par_iter()
            .fold(PopulationTally::new, |mut tally, result| {
                tally.add(result);
                tally
            })
            .reduce(PopulationTally::new, PopulationTally::merge);
        Ok((results, tally))
    }

    /// Fallback when parallel feature is disabled
    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, records: &[MemberRecords]) -> EvalResult<(Vec<MemberMeasureResult>, PopulationTally)> {
        self.evaluate_sequential(records)
    }

    /// Sequential evaluation in dataset order
    pub fn evaluate_sequential(
        &self,
        records: &[MemberRecords],
    ) -> EvalResult<(Vec<MemberMeasureResult>, PopulationTally)> {
        let results = records
            .iter()
            .map(|r| self.evaluate_member(r))
            .collect::<EvalResult<Vec<_>>>()?;
        let tally = PopulationTally::from_results(&results);
        Ok((results, tally))
    }
}

/// Results of one measure over one population
#[derive(Debug, Clone, Serialize)]
pub struct MeasureRun {
    pub measure_id: String,
    pub measurement_year: i32,
    /// One row per member, in dataset order
    pub results: Vec<MemberMeasureResult>,
    pub summary: PopulationSummary,
    /// Data-quality findings from ingestion
    pub diagnostics: Vec<Diagnostic>,
}

impl MeasureRun {
    pub fn gaps(&self) -> impl Iterator<Item = &MemberMeasureResult> {
        self.results.iter().filter(|r| r.has_gap)
    }

    /// Gaps ordered for outreach: highest score first, then member id
    pub fn work_list(&self) -> Vec<&MemberMeasureResult> {
        let mut gaps: Vec<_> = self.gaps().collect();
        gaps.sort_by(|a, b| {
            b.priority_score
                .cmp(&a.priority_score)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        gaps
    }
}
