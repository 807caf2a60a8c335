//! Dense, gap-filled table assembly.
//!
//! Turns a [`MergedSeries`] into a [`DenseTable`]: one row per calendar day
//! of the requested window, one numeric column per merged metric, target
//! metric first. Dates without data become rows of zeros.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::coerce_numeric,
    dates::{ISO_DATE_FORMAT, calendar_days, is_iso_date, parse_iso_date},
    error::{MergeError, MergeResult},
    merge::MergedSeries,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseTable {
    #[serde(rename = "index")]
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    #[serde(rename = "data")]
    rows: Vec<Vec<f64>>,
}

impl DenseTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn target_column(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or_default()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        let row = self.dates.binary_search(&date).ok()?;
        Some(self.rows[row][col])
    }

    pub fn contains_zero(&self) -> bool {
        self.rows.iter().flatten().any(|v| *v == 0.0)
    }
}

pub fn assemble(
    merged: &MergedSeries,
    from_date: &str,
    to_date: &str,
    target_column: &str,
) -> MergeResult<(DenseTable, bool)> {
    if merged.is_empty() {
        return Err(MergeError::EmptyMerge);
    }
    let from = parse_iso_date(from_date)?;
    let to = parse_iso_date(to_date)?;
    let dates = calendar_days(from, to)?;

    let mut columns = merged.metric_names();
    let Some(target_idx) = columns.iter().position(|c| c == target_column) else {
        return Err(MergeError::TargetColumnMissing(target_column.to_string()));
    };
    let target = columns.remove(target_idx);
    columns.insert(0, target);

    // Keys must be canonical so that two spellings of one day cannot collide.
    let mut by_date: HashMap<NaiveDate, &str> = HashMap::with_capacity(merged.len());
    for key in merged.dates() {
        if !is_iso_date(key) {
            return Err(MergeError::date_format(key, ISO_DATE_FORMAT));
        }
        by_date.insert(parse_iso_date(key)?, key);
    }

    let mut filled = 0usize;
    let rows: Vec<Vec<f64>> = dates
        .iter()
        .map(|date| match by_date.get(date).and_then(|key| merged.metrics_for(key)) {
            Some(metrics) => columns
                .iter()
                .map(|column| metrics.get(column).map(coerce_numeric).unwrap_or(0.0))
                .collect(),
            None => {
                filled += 1;
                vec![0.0; columns.len()]
            }
        })
        .collect();

    let outside = by_date
        .keys()
        .filter(|date| **date < from || **date > to)
        .count();
    if outside > 0 {
        debug!("Dropped {outside} merged date(s) outside {from}..={to}");
    }

    let table = DenseTable {
        dates,
        columns,
        rows,
    };
    let has_filled_gaps = table.contains_zero();
    info!(
        "Assembled {} row(s) x {} column(s); {} date(s) gap-filled",
        table.row_count(),
        table.columns.len(),
        filled
    );
    Ok((table, has_filled_gaps))
}
