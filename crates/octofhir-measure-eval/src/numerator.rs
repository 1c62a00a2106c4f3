//! Numerator satisfaction
//!
//! Three combination rules are supported:
//!
//! - **ANY-of**: each modality is matched against its own lookback window
//!   `[Jan 1 (year - lookback), Dec 31 year]`. The most recent match in the
//!   window is kept. The reported modality is the first satisfied one in
//!   declaration order; later modalities never change the compliance flag.
//! - **ALL-of**: every modality must match inside the measurement year.
//! - **THRESHOLD**: PDC of the target medication class at or above the
//!   configured percentage.
//!
//! Records without a usable date never match a window.

use crate::context::{DateWindow, MeasurementPeriod};
use crate::pdc::{PdcResult, calculate_pdc, class_fills, fills_within};
use chrono::NaiveDate;
use log::trace;
use octofhir_measure_model::MemberRecords;
use octofhir_measure_registry::{CombinationRule, EvidenceSource, MeasureSpec, MedicationClass, Modality};
use serde::Serialize;
use smallvec::SmallVec;

/// What was found for one modality
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalityEvidence {
    pub modality: String,
    /// Most recent match inside the modality's window
    pub latest_in_window: Option<NaiveDate>,
    /// Most recent match before the window opened
    pub latest_before_window: Option<NaiveDate>,
}

impl ModalityEvidence {
    pub fn satisfied(&self) -> bool {
        self.latest_in_window.is_some()
    }

    /// Evidence exists, but only before the window
    pub fn lapsed(&self) -> bool {
        self.latest_in_window.is_none() && self.latest_before_window.is_some()
    }
}

/// Numerator decision for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumeratorOutcome {
    pub compliant: bool,
    pub reason: String,
    /// Reported satisfying modality (or medication class)
    pub modality: Option<String>,
    pub evidence_date: Option<NaiveDate>,
    /// Per-modality findings in declaration order
    pub evidence: SmallVec<[ModalityEvidence; 4]>,
    pub pdc: Option<PdcResult>,
    /// Qualifying fills dated in the measurement year
    pub fill_count: Option<u32>,
}

/// Collect dated matches for a modality relative to its window
fn gather(modality: &Modality, window: DateWindow, records: &MemberRecords) -> ModalityEvidence {
    let dates: Vec<NaiveDate> = match modality.source {
        EvidenceSource::Lab => records
            .labs
            .iter()
            .filter(|lab| modality.codes.matches(lab.test_code.as_deref()))
            .filter_map(|lab| lab.test_date)
            .collect(),
        EvidenceSource::Pharmacy => match &modality.medication {
            Some(class) => class_fills(&records.fills, class)
                .into_iter()
                .filter_map(|fill| fill.fill_date)
                .collect(),
            None => Vec::new(),
        },
        source => records
            .claims
            .iter()
            .filter(|claim| source.claim_matches(claim, &modality.codes))
            .filter_map(|claim| claim.service_date)
            .collect(),
    };

    ModalityEvidence {
        modality: modality.id.clone(),
        latest_in_window: dates.iter().copied().filter(|d| window.contains(*d)).max(),
        latest_before_window: dates.iter().copied().filter(|d| *d < window.start).max(),
    }
}

/// Decide numerator satisfaction for a final-denominator member
pub fn evaluate_numerator(
    spec: &MeasureSpec,
    period: &MeasurementPeriod,
    records: &MemberRecords,
) -> NumeratorOutcome {
    let outcome = match &spec.rule {
        CombinationRule::AnyOf => any_of(spec, period, records),
        CombinationRule::AllOf => all_of(spec, period, records),
        CombinationRule::Threshold {
            medication,
            threshold_pct,
            ..
        } => threshold(medication, *threshold_pct, period, records),
    };
    trace!("{} numerator for {}: {}", records.member_id(), spec.id, outcome.reason);
    outcome
}

fn any_of(spec: &MeasureSpec, period: &MeasurementPeriod, records: &MemberRecords) -> NumeratorOutcome {
    let evidence: SmallVec<[ModalityEvidence; 4]> = spec
        .modalities
        .iter()
        .map(|m| gather(m, period.lookback(m.lookback_years), records))
        .collect();

    let satisfied = evidence
        .iter()
        .find_map(|e| e.latest_in_window.map(|on| (e.modality.clone(), on)));

    match satisfied {
        Some((modality, on)) => NumeratorOutcome {
            compliant: true,
            reason: format!("compliant_{}_{}", modality, on.format("%Y-%m-%d")),
            modality: Some(modality),
            evidence_date: Some(on),
            evidence,
            pdc: None,
            fill_count: None,
        },
        None => NumeratorOutcome {
            compliant: false,
            reason: "no_evidence_in_lookback_windows".to_string(),
            modality: None,
            evidence_date: None,
            evidence,
            pdc: None,
            fill_count: None,
        },
    }
}

fn all_of(spec: &MeasureSpec, period: &MeasurementPeriod, records: &MemberRecords) -> NumeratorOutcome {
    let window = period.window();
    let evidence: SmallVec<[ModalityEvidence; 4]> = spec
        .modalities
        .iter()
        .map(|m| gather(m, window, records))
        .collect();

    let missing: Vec<&str> = evidence
        .iter()
        .filter(|e| !e.satisfied())
        .map(|e| e.modality.as_str())
        .collect();

    if missing.is_empty() {
        let latest = evidence.iter().filter_map(|e| e.latest_in_window).max();
        NumeratorOutcome {
            compliant: true,
            reason: match latest {
                Some(on) => format!("compliant_all_{}", on.format("%Y-%m-%d")),
                None => "compliant_all".to_string(),
            },
            modality: None,
            evidence_date: latest,
            evidence,
            pdc: None,
            fill_count: None,
        }
    } else {
        NumeratorOutcome {
            compliant: false,
            reason: format!("missing_{}", missing.join("_")),
            modality: None,
            evidence_date: None,
            evidence,
            pdc: None,
            fill_count: None,
        }
    }
}

fn threshold(
    medication: &MedicationClass,
    threshold_pct: f64,
    period: &MeasurementPeriod,
    records: &MemberRecords,
) -> NumeratorOutcome {
    let window = period.window();
    let fills = class_fills(&records.fills, medication);
    let fill_count = fills_within(&fills, window);
    let pdc = calculate_pdc(fills.iter().copied(), window);

    let (compliant, reason) = if fills.is_empty() {
        (false, "no_fills_found".to_string())
    } else if pdc.meets(threshold_pct) {
        (true, format!("pdc_{:.1}_meets_{}", pdc.pdc, threshold_pct))
    } else {
        (false, format!("pdc_{:.1}_below_{}", pdc.pdc, threshold_pct))
    };

    NumeratorOutcome {
        compliant,
        reason,
        modality: compliant.then(|| medication.id().to_string()),
        evidence_date: None,
        evidence: SmallVec::new(),
        pdc: Some(pdc),
        fill_count: Some(fill_count),
    }
}
