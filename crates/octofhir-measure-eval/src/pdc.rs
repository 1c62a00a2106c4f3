//! Proportion of Days Covered
//!
//! Coverage is a union of calendar days, not a sum of supplies: two fills
//! covering the same day count that day once. Early refills are not shifted
//! forward (no pharmacy stacking).

use crate::context::DateWindow;
use chrono::NaiveDate;
use octofhir_measure_model::PharmacyFill;
use octofhir_measure_registry::MedicationClass;
use serde::Serialize;
use std::collections::BTreeSet;

/// Coverage over a measurement window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PdcResult {
    /// Percentage in `[0, 100]`
    pub pdc: f64,
    pub days_covered: u32,
    pub total_days: u32,
}

impl PdcResult {
    fn new(days_covered: i64, total_days: i64) -> Self {
        let pdc = if total_days > 0 {
            days_covered as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };
        Self {
            pdc,
            days_covered: days_covered as u32,
            total_days: total_days.max(0) as u32,
        }
    }

    pub fn meets(&self, threshold_pct: f64) -> bool {
        self.pdc >= threshold_pct
    }
}

/// Fills whose medication name belongs to the class
pub fn class_fills<'a>(fills: &'a [PharmacyFill], medication: &MedicationClass) -> Vec<&'a PharmacyFill> {
    fills
        .iter()
        .filter(|f| medication.matches(&f.medication_name))
        .collect()
}

/// Count fills dated inside the window
pub fn fills_within(fills: &[&PharmacyFill], window: DateWindow) -> u32 {
    fills.iter().filter(|f| window.contains_opt(f.fill_date)).count() as u32
}

/// Clip each fill's coverage to the window, dropping empty intervals
fn clipped_intervals<'a>(
    fills: impl IntoIterator<Item = &'a PharmacyFill>,
    window: DateWindow,
) -> Vec<(NaiveDate, NaiveDate)> {
    fills
        .into_iter()
        .filter_map(PharmacyFill::coverage)
        .filter_map(|(start, end)| {
            let start = start.max(window.start);
            let end = end.min(window.end);
            (start <= end).then_some((start, end))
        })
        .collect()
}

/// PDC by sorted interval merge
pub fn calculate_pdc<'a>(
    fills: impl IntoIterator<Item = &'a PharmacyFill>,
    window: DateWindow,
) -> PdcResult {
    let mut intervals = clipped_intervals(fills, window);
    intervals.sort_unstable();

    let mut covered: i64 = 0;
    let mut current: Option<(NaiveDate, NaiveDate)> = None;
    for (start, end) in intervals {
        current = match current {
            // Overlapping or adjacent: extend
            Some((cur_start, cur_end)) if start <= cur_end.succ_opt().unwrap_or(cur_end) => {
                Some((cur_start, cur_end.max(end)))
            }
            Some((cur_start, cur_end)) => {
                covered += (cur_end - cur_start).num_days() + 1;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((cur_start, cur_end)) = current {
        covered += (cur_end - cur_start).num_days() + 1;
    }

    PdcResult::new(covered, window.days())
}

/// PDC by materializing every covered day
///
/// Reference semantics for [`calculate_pdc`]; both return identical results.
pub fn calculate_pdc_day_set<'a>(
    fills: impl IntoIterator<Item = &'a PharmacyFill>,
    window: DateWindow,
) -> PdcResult {
    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    for (start, end) in clipped_intervals(fills, window) {
        days.extend(start.iter_days().take_while(|d| *d <= end));
    }
    PdcResult::new(days.len() as i64, window.days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MeasurementPeriod;
    use chrono::Days;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fill(on: NaiveDate, supply: Option<i64>) -> PharmacyFill {
        PharmacyFill::new("M1", "lisinopril 10mg", Some(on), supply)
    }

    fn year() -> DateWindow {
        MeasurementPeriod::new(2025).unwrap().window()
    }

    fn every(start: NaiveDate, count: u64, spacing: u64) -> Vec<PharmacyFill> {
        (0..count)
            .map(|i| fill(start + Days::new(i * spacing), Some(30)))
            .collect()
    }

    #[test]
    fn test_zero_fills() {
        let result = calculate_pdc(&Vec::<PharmacyFill>::new(), year());
        assert_eq!(result.pdc, 0.0);
        assert_eq!(result.days_covered, 0);
        assert_eq!(result.total_days, 365);
    }

    #[test]
    fn test_twelve_back_to_back_fills() {
        let fills = every(date(2025, 1, 1), 12, 30);
        let result = calculate_pdc(&fills, year());

        assert_eq!(result.days_covered, 360);
        assert!((result.pdc - 98.63).abs() < 0.01);
        assert!(result.meets(80.0));
    }

    #[test]
    fn test_five_fills_75_days_apart() {
        let fills = every(date(2025, 1, 1), 5, 75);
        let result = calculate_pdc(&fills, year());

        assert_eq!(result.days_covered, 150);
        assert!((result.pdc - 41.1).abs() < 0.01);
        assert!(!result.meets(80.0));
    }

    #[test]
    fn test_overlapping_fills_do_not_double_count() {
        let fills = vec![fill(date(2025, 3, 1), Some(30)), fill(date(2025, 3, 1), Some(30))];
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 30);
    }

    #[test]
    fn test_fill_clipped_at_both_ends() {
        let fills = vec![
            fill(date(2024, 12, 20), Some(30)),
            fill(date(2025, 12, 20), Some(30)),
        ];
        // Jan 1-18 plus Dec 20-31
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 18 + 12);
    }

    #[test]
    fn test_fill_outside_window_discarded() {
        let fills = vec![fill(date(2024, 1, 1), Some(30)), fill(date(2026, 1, 1), Some(30))];
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 0);
    }

    #[test]
    fn test_missing_supply_defaults_to_30() {
        let fills = vec![fill(date(2025, 6, 1), None)];
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 30);
    }

    #[test]
    fn test_non_positive_supply_contributes_nothing() {
        let fills = vec![fill(date(2025, 6, 1), Some(0)), fill(date(2025, 7, 1), Some(-10))];
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 0);
    }

    #[test]
    fn test_adjacent_fills_merge() {
        let fills = vec![fill(date(2025, 1, 1), Some(10)), fill(date(2025, 1, 11), Some(10))];
        assert_eq!(calculate_pdc(&fills, year()).days_covered, 20);
    }

    #[test]
    fn test_class_fills_and_in_year_count() {
        let statins = MedicationClass::new("statins", ["statin"]).unwrap();
        let fills = vec![
            PharmacyFill::new("M1", "Atorvastatin 20mg", Some(date(2024, 12, 15)), Some(30)),
            PharmacyFill::new("M1", "ATORVASTATIN 20MG", Some(date(2025, 1, 14)), Some(30)),
            PharmacyFill::new("M1", "metformin", Some(date(2025, 1, 14)), Some(30)),
            PharmacyFill::new("M1", "simvastatin", None, Some(30)),
        ];
        let matched = class_fills(&fills, &statins);

        assert_eq!(matched.len(), 3);
        assert_eq!(fills_within(&matched, year()), 1);
        // Prior-year fill spills into January
        assert_eq!(calculate_pdc(matched, year()).days_covered, 13 + 30);
    }

    #[test]
    fn test_year_long_supply_caps_at_100() {
        let fills = vec![fill(date(2025, 1, 1), Some(400)), fill(date(2025, 2, 1), Some(90))];
        let result = calculate_pdc(&fills, year());
        assert_eq!(result.days_covered, 365);
        assert_eq!(result.pdc, 100.0);
    }

    #[rstest]
    #[case(100_000_000)]
    #[case(i64::MAX)]
    fn test_oversized_supply_covers_whole_year(#[case] supply: i64) {
        let fills = vec![fill(date(2025, 1, 1), Some(supply))];
        let merged = calculate_pdc(&fills, year());
        assert_eq!(merged.days_covered, 365);
        assert_eq!(merged.pdc, 100.0);
        assert_eq!(calculate_pdc_day_set(&fills, year()), merged);

        let prior = vec![fill(date(2024, 7, 1), Some(supply))];
        assert_eq!(calculate_pdc(&prior, year()).days_covered, 365);
    }

    fn arb_fill() -> impl Strategy<Value = PharmacyFill> {
        (0i64..500, prop::option::of(-10i64..120)).prop_map(|(offset, supply)| {
            let on = date(2024, 10, 1) + chrono::Duration::days(offset);
            fill(on, supply)
        })
    }

    proptest! {
        #[test]
        fn prop_merge_matches_day_set(fills in prop::collection::vec(arb_fill(), 0..40)) {
            prop_assert_eq!(calculate_pdc(&fills, year()), calculate_pdc_day_set(&fills, year()));
        }

        #[test]
        fn prop_pdc_in_range(fills in prop::collection::vec(arb_fill(), 0..40)) {
            let result = calculate_pdc(&fills, year());
            prop_assert!(result.pdc >= 0.0 && result.pdc <= 100.0);
            prop_assert!(result.days_covered <= result.total_days);
        }

        #[test]
        fn prop_order_independent(fills in prop::collection::vec(arb_fill(), 0..40)) {
            let mut reversed = fills.clone();
            reversed.reverse();
            prop_assert_eq!(calculate_pdc(&fills, year()), calculate_pdc(&reversed, year()));
        }

        #[test]
        fn prop_duplicates_do_not_inflate(fills in prop::collection::vec(arb_fill(), 0..20)) {
            let doubled: Vec<PharmacyFill> = fills.iter().chain(fills.iter()).cloned().collect();
            prop_assert_eq!(calculate_pdc(&fills, year()), calculate_pdc(&doubled, year()));
        }
    }
}
