//! Claims-based exclusions
//!
//! Rules are checked in declaration order and the first match wins, so a
//! member always carries a single exclusion reason.

use crate::context::MeasurementPeriod;
use log::debug;
use octofhir_measure_model::ClaimEvent;
use octofhir_measure_registry::{ExclusionRule, ExclusionWindow};
use serde::Serialize;

/// Exclusion decision for one member
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Exclusion {
    pub excluded: bool,
    pub reason: Option<String>,
}

impl Exclusion {
    pub fn none() -> Self {
        Self::default()
    }

    fn matched(reason: &str) -> Self {
        Self {
            excluded: true,
            reason: Some(reason.to_string()),
        }
    }
}

fn rule_matches(rule: &ExclusionRule, period: &MeasurementPeriod, claim: &ClaimEvent) -> bool {
    if !rule.source.claim_matches(claim, &rule.codes) {
        return false;
    }
    match rule.window {
        // The code itself is the evidence; dates are irrelevant
        ExclusionWindow::Ever => true,
        ExclusionWindow::MeasurementYear => period.window().contains_opt(claim.service_date),
    }
}

/// Apply exclusion rules to a member's claim history
pub fn evaluate_exclusions(
    rules: &[ExclusionRule],
    period: &MeasurementPeriod,
    claims: &[ClaimEvent],
) -> Exclusion {
    for rule in rules {
        if let Some(claim) = claims.iter().find(|claim| rule_matches(rule, period, claim)) {
            debug!("{} excluded: {}", claim.member_id, rule.reason);
            return Exclusion::matched(&rule.reason);
        }
    }
    Exclusion::none()
}
