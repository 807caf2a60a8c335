//! Date parsing, range extraction and calendar sequences.

use chrono::{Days, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::{
    data::{Cell, RawRow},
    error::{MergeError, MergeResult},
};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
/// Month-abbreviation day year, e.g. `Jan 05 2024`.
pub const ALT_DATE_FORMAT: &str = "%b %d %Y";
/// Compact form used by the analytics report API, e.g. `20240105`.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min_date: String,
    pub max_date: String,
}

impl DateRange {
    /// Both bounds must be strict ISO dates.
    pub fn ensure_iso(&self) -> MergeResult<()> {
        for bound in [&self.min_date, &self.max_date] {
            if !is_iso_date(bound) {
                return Err(MergeError::date_format(bound.as_str(), ISO_DATE_FORMAT));
            }
        }
        Ok(())
    }
}

pub fn parse_iso_date(value: &str) -> MergeResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
        .map_err(|_| MergeError::date_format(value, ISO_DATE_FORMAT))
}

/// Strict check: the text must round-trip through `%Y-%m-%d` unchanged.
pub fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map(|d| d.format(ISO_DATE_FORMAT).to_string() == value)
        .unwrap_or(false)
}

pub fn reformat_date(value: &str, from_format: &str) -> MergeResult<String> {
    NaiveDate::parse_from_str(value.trim(), from_format)
        .map(|d| d.format(ISO_DATE_FORMAT).to_string())
        .map_err(|_| MergeError::date_format(value, from_format))
}

pub fn date_range(rows: &[RawRow], date_column: &str, convert: bool) -> MergeResult<DateRange> {
    let mut min_date: Option<String> = None;
    let mut max_date: Option<String> = None;

    for cell in rows.iter().filter_map(|row| row.get(date_column)) {
        let raw = cell.as_display();
        let value = if convert {
            reformat_date(&raw, ALT_DATE_FORMAT)?
        } else {
            raw.into_owned()
        };
        if min_date.as_ref().is_none_or(|current| value < *current) {
            min_date = Some(value.clone());
        }
        if max_date.as_ref().is_none_or(|current| value > *current) {
            max_date = Some(value);
        }
    }

    match (min_date, max_date) {
        (Some(min_date), Some(max_date)) => {
            debug!("Date range for '{date_column}': {min_date}..={max_date}");
            Ok(DateRange { min_date, max_date })
        }
        _ => Err(MergeError::malformed(format!(
            "no values found in date column '{date_column}'"
        ))),
    }
}

/// Rewrites alternate-format dates in place to ISO text.
pub fn normalize_dates(rows: &mut [RawRow], date_column: &str) -> MergeResult<usize> {
    let mut rewritten = 0usize;
    for row in rows.iter_mut() {
        if let Some(cell) = row.get_mut(date_column) {
            let iso = reformat_date(&cell.as_display(), ALT_DATE_FORMAT)?;
            *cell = Cell::Text(iso);
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Every calendar day from `from` to `to`, both inclusive.
pub fn calendar_days(from: NaiveDate, to: NaiveDate) -> MergeResult<Vec<NaiveDate>> {
    if from > to {
        return Err(MergeError::InvalidDateRange {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let span = (to - from).num_days() as usize + 1;
    let mut days = Vec::with_capacity(span);
    let mut current = from;
    while current <= to {
        days.push(current);
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(days)
}
