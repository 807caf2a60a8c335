use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{assemble::DenseTable, data::format_number, dates::ISO_DATE_FORMAT};

/// Renders an aligned plain-text table. Cells that look numeric are
/// right-aligned, everything else is left-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h).max(1)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, false));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, false));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, true));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Text rows of a dense table, date first.
pub fn dense_rows(table: &DenseTable) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = std::iter::once("date".to_string())
        .chain(table.columns().iter().cloned())
        .collect();
    let rows = table
        .dates()
        .iter()
        .zip(table.rows())
        .map(|(date, values)| {
            std::iter::once(date.format(ISO_DATE_FORMAT).to_string())
                .chain(values.iter().map(|v| format_number(*v)))
                .collect()
        })
        .collect();
    (headers, rows)
}

pub fn render_dense_table(table: &DenseTable) -> String {
    let (headers, rows) = dense_rows(table);
    render_table(&headers, &rows)
}

fn format_row(values: &[String], widths: &[usize], align_numbers: bool) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
            if align_numbers && looks_numeric(&sanitized) {
                format!("{padding}{sanitized}")
            } else {
                format!("{sanitized}{padding}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn looks_numeric(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
