//! Analytics batch report responses.
//!
//! Each report row carries the `date` dimension as `YYYYMMDD` followed by
//! metric values in `metricHeaders` order.

use serde::Deserialize;

use crate::{
    data::{Cell, RawRow},
    dates::{COMPACT_DATE_FORMAT, reformat_date},
    error::{MergeError, MergeResult},
    sources::NORMALIZED_DATE_COLUMN,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReportResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub metric_headers: Vec<MetricHeader>,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricHeader {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<ReportValue>,
    #[serde(default)]
    pub metric_values: Vec<ReportValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportValue {
    #[serde(default)]
    pub value: String,
}

impl BatchReportResponse {
    /// Metric names across all reports, first appearance order.
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for header in self.reports.iter().flat_map(|r| r.metric_headers.iter()) {
            if !names.contains(&header.name) {
                names.push(header.name.clone());
            }
        }
        names
    }
}

pub fn rows_from_response(response: &BatchReportResponse) -> MergeResult<Vec<RawRow>> {
    let mut rows = Vec::new();
    for report in &response.reports {
        for report_row in &report.rows {
            let raw_date = report_row
                .dimension_values
                .first()
                .map(|d| d.value.as_str())
                .ok_or_else(|| MergeError::malformed("analytics row has no date dimension"))?;
            let date = reformat_date(raw_date, COMPACT_DATE_FORMAT)?;

            let mut row = RawRow::new();
            row.insert(NORMALIZED_DATE_COLUMN, date);
            for (header, metric) in report.metric_headers.iter().zip(&report_row.metric_values) {
                row.insert(header.name.as_str(), Cell::text(metric.value.as_str()));
            }
            rows.push(row);
        }
    }
    Ok(rows)
}
