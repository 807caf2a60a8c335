//! Benchmark-style feeds with a category breakdown.
//!
//! Rows are filtered by per-field allow-lists, summed per `(date, category)`
//! and pivoted so each requested `(category, field)` pair becomes one
//! column named `<category>[<field>]`.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{RawRow, coerce_numeric},
    error::{MergeError, MergeResult},
    sources::{SourceKind, dated_row},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extraction {
    pub category: String,
    pub field: String,
}

impl Extraction {
    pub fn column_name(&self) -> String {
        format!("{}[{}]", self.category, self.field)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSettings {
    pub date_column: String,
    pub category_column: String,
    /// Field name to allowed values; every filter must match.
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
    pub extract: Vec<Extraction>,
}

impl GroupSettings {
    pub fn columns(&self) -> Vec<String> {
        self.extract.iter().map(Extraction::column_name).collect()
    }

    fn passes_filters(&self, row: &RawRow) -> bool {
        self.filters.iter().all(|(field, allowed)| {
            row.get(field)
                .is_some_and(|cell| allowed.iter().any(|a| *a == cell.as_display()))
        })
    }
}

fn text_of(row: &RawRow, column: &str) -> MergeResult<String> {
    row.get(column)
        .map(|cell| cell.as_display().into_owned())
        .ok_or_else(|| MergeError::missing_key(SourceKind::Benchmark.tag(), column))
}

pub fn group_and_sum(rows: &[RawRow], settings: &GroupSettings) -> MergeResult<Vec<RawRow>> {
    let fields: Vec<&str> = settings
        .extract
        .iter()
        .map(|e| e.field.as_str())
        .unique()
        .collect();

    // date -> category -> field -> sum
    let mut sums: IndexMap<String, HashMap<String, HashMap<&str, f64>>> = IndexMap::new();
    let mut kept = 0usize;
    for row in rows.iter().filter(|row| settings.passes_filters(row)) {
        kept += 1;
        let date = text_of(row, &settings.date_column)?;
        let category = text_of(row, &settings.category_column)?;
        let group = sums.entry(date).or_default().entry(category).or_default();
        for field in &fields {
            let cell = row
                .get(field)
                .ok_or_else(|| MergeError::missing_key(SourceKind::Benchmark.tag(), field))?;
            *group.entry(*field).or_insert(0.0) += coerce_numeric(cell);
        }
    }
    debug!(
        "Grouped {kept} of {} benchmark row(s) into {} day(s)",
        rows.len(),
        sums.len()
    );

    Ok(sums
        .iter()
        .map(|(date, categories)| {
            dated_row(
                date,
                settings.extract.iter().map(|extraction| {
                    let value = categories
                        .get(&extraction.category)
                        .and_then(|by_field| by_field.get(extraction.field.as_str()))
                        .copied()
                        .unwrap_or(0.0);
                    (extraction.column_name(), value)
                }),
            )
        })
        .collect())
}
