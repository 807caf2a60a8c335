//! Column classification for raw source batches.
//!
//! A batch is split into exactly one date column, numeric columns and
//! categorical columns. Classification drives which columns a caller may
//! declare as metrics when merging a source.
//!
//! ## Rules
//!
//! - The first column (in the first row's order) whose lowercase name
//!   contains `date` is the date column. At most one is picked.
//! - Every other column is evaluated once over all rows. Blank cells are
//!   rewritten to `"0"` in place before testing, so that downstream numeric
//!   coercion sees an explicit zero.
//! - A column is numeric when each value, with `.` removed, is a run of
//!   digits. A single disqualifying value makes it categorical.

use log::debug;
use serde::Serialize;

use crate::{
    data::{Cell, RawRow, is_digit_token},
    error::{MergeError, MergeResult},
};

pub const DATE_COLUMN_TOKEN: &str = "date";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnClassification {
    pub numeric_columns: Vec<String>,
    pub date_column: Option<String>,
    pub categorical_columns: Vec<String>,
}

impl ColumnClassification {
    pub fn require_date_column(&self) -> MergeResult<&str> {
        self.date_column.as_deref().ok_or_else(|| {
            MergeError::malformed(
                "'date' column not found. Add 'date' heading and use date format 'yyyy-mm-dd' in the values",
            )
        })
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == column)
    }

    /// Every classified column, date column first.
    pub fn all_columns(&self) -> impl Iterator<Item = &str> {
        self.date_column
            .iter()
            .chain(self.numeric_columns.iter())
            .chain(self.categorical_columns.iter())
            .map(String::as_str)
    }
}

pub fn find_date_column<'a, I>(columns: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    columns
        .into_iter()
        .find(|name| name.to_lowercase().contains(DATE_COLUMN_TOKEN))
}

pub fn classify(rows: &mut [RawRow]) -> MergeResult<ColumnClassification> {
    let Some(first) = rows.first() else {
        return Err(MergeError::malformed(
            "source returned no rows; there are no columns to inspect",
        ));
    };
    if first.is_empty() {
        return Err(MergeError::malformed("source rows have no columns"));
    }

    let columns: Vec<String> = first.columns().map(str::to_string).collect();
    let date_column = find_date_column(columns.iter().map(String::as_str)).map(str::to_string);

    let mut classification = ColumnClassification {
        date_column: date_column.clone(),
        ..ColumnClassification::default()
    };

    for column in columns
        .iter()
        .filter(|c| Some(c.as_str()) != date_column.as_deref())
    {
        let mut numeric = true;
        for row in rows.iter_mut() {
            if row.get(column).is_none_or(Cell::is_blank) {
                row.insert(column.as_str(), "0");
            }
            if numeric {
                let value = row.get(column).map(|c| c.as_display()).unwrap_or_default();
                numeric = is_digit_token(&value);
            }
        }
        if numeric {
            classification.numeric_columns.push(column.clone());
        } else {
            classification.categorical_columns.push(column.clone());
        }
    }

    debug!(
        "Classified {} row(s): date={:?}, numeric={:?}, categorical={:?}",
        rows.len(),
        classification.date_column,
        classification.numeric_columns,
        classification.categorical_columns
    );
    Ok(classification)
}
