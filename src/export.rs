//! Writing assembled tables for the report renderer.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{assemble::DenseTable, period::ImpactWindow, table::dense_rows};

pub fn write_csv<W: Write>(writer: &mut csv::Writer<W>, table: &DenseTable) -> Result<()> {
    let (headers, rows) = dense_rows(table);
    writer
        .write_record(&headers)
        .context("Writing table headers")?;
    for (idx, row) in rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing table row {}", idx + 1))?;
    }
    writer.flush().context("Flushing table output")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    table: &'a DenseTable,
    has_filled_gaps: bool,
    pre_period: [usize; 2],
    post_period: [usize; 2],
}

pub fn write_json<W: Write>(
    writer: W,
    table: &DenseTable,
    has_filled_gaps: bool,
    window: &ImpactWindow,
) -> Result<()> {
    let report = JsonReport {
        table,
        has_filled_gaps,
        pre_period: window.pre_period.as_pair(),
        post_period: window.post_period.as_pair(),
    };
    serde_json::to_writer_pretty(writer, &report).context("Serializing table as JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assemble::assemble, data::Cell, merge::MergedSeries};

    fn table() -> (DenseTable, bool) {
        let mut merged = MergedSeries::new();
        merged.insert("2024-01-01", "ga4_sessions", Cell::text("12"));
        merged.insert("2024-01-02", "csv_orders", Cell::text("2.5"));
        assemble(&merged, "2024-01-01", "2024-01-02", "csv_orders").unwrap()
    }

    #[test]
    fn csv_has_date_column_then_target() {
        let (table, _) = table();
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_csv(&mut writer, &table).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "date,csv_orders,ga4_sessions",
                "2024-01-01,0,12",
                "2024-01-02,2.5,0"
            ]
        );
    }

    #[test]
    fn json_carries_index_columns_and_periods() {
        let (table, gaps) = table();
        let window = ImpactWindow::from_dates("2024-01-01", "2024-01-02", "2024-01-02").unwrap();
        let mut buffer = Vec::new();
        write_json(&mut buffer, &table, gaps, &window).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["index"][1], "2024-01-02");
        assert_eq!(value["columns"][0], "csv_orders");
        assert_eq!(value["data"][1][0], 2.5);
        assert_eq!(value["has_filled_gaps"], true);
        assert_eq!(value["pre_period"], serde_json::json!([0, 0]));
        assert_eq!(value["post_period"], serde_json::json!([1, 1]));
    }
}
