//! Date parsing and age calculation

use chrono::{Datelike, NaiveDate};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse a calendar date from the formats found in claims extracts
///
/// Accepts ISO dates, ISO date-times (the time part is ignored),
/// slash-separated dates and compact `YYYYMMDD`. Returns `None` when the
/// text is blank or not a valid calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Date-time values: keep the date part
    let text = match raw.char_indices().nth(10) {
        Some((idx, 'T')) | Some((idx, ' ')) => &raw[..idx],
        _ => raw,
    };

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Age in whole years at `as_of`
pub fn age_at(birth_date: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut years = as_of.year() - birth_date.year();
    // Adjust if birthday hasn't occurred yet this year
    if (as_of.month(), as_of.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years
}
