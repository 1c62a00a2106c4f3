//! Measurement period and date windows

use crate::error::{EvalError, EvalResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Optional record dates never fall inside a window
    pub fn contains_opt(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| self.contains(d))
    }

    /// Number of calendar days, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The calendar year a measure is evaluated for
///
/// Age and enrollment are anchored at Dec 31 of this year. Lookback windows
/// reach back whole calendar years and always end on Dec 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MeasurementPeriod {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MeasurementPeriod {
    pub fn new(year: i32) -> EvalResult<Self> {
        if !(1900..=9999).contains(&year) {
            return Err(EvalError::invalid_year(year));
        }
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| EvalError::invalid_year(year))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| EvalError::invalid_year(year))?;
        Ok(Self { year, start, end })
    }

    /// Dec 31 of the measurement year
    pub fn anchor(&self) -> NaiveDate {
        self.end
    }

    /// The measurement year itself
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start, self.end)
    }

    /// `[Jan 1 of (year - years), Dec 31 of year]`
    pub fn lookback(&self, years: u32) -> DateWindow {
        let start_year = self.year - years as i32;
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or(NaiveDate::MIN);
        DateWindow::new(start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    /// 365 or 366
    pub fn total_days(&self) -> i64 {
        self.window().days()
    }
}
