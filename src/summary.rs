//! Descriptive statistics of an assembled table, shown alongside a report
//! so that flat or zero-heavy columns are visible before modeling.

use serde::Serialize;

use crate::{assemble::DenseTable, data::format_number};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

pub const SUMMARY_HEADERS: &[&str] = &[
    "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
];

impl ColumnSummary {
    fn from_values(column: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        });
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        let fmt = |v: f64| {
            if v.fract() == 0.0 {
                format_number(v)
            } else {
                format!("{v:.4}")
            }
        };
        vec![
            self.column.clone(),
            self.count.to_string(),
            fmt(self.mean),
            self.std.map(fmt).unwrap_or_else(|| "NaN".to_string()),
            fmt(self.min),
            fmt(self.p25),
            fmt(self.p50),
            fmt(self.p75),
            fmt(self.max),
        ]
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

pub fn summarize(table: &DenseTable) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .filter_map(|column| {
            let values = table.column_values(column)?;
            ColumnSummary::from_values(column, &values)
        })
        .collect()
}
