//! Accumulating merge of per-source rows into one date-keyed series.
//!
//! Each source is merged under a short tag. Metric keys are written as
//! `<tag>_<column>`, so sources never overwrite each other; within one
//! source, a later row for the same date replaces the earlier value.

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, RawRow},
    error::{MergeError, MergeResult},
};

/// Which columns of a source batch feed the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSettings {
    pub date_column: String,
    pub metrics: Vec<String>,
}

impl MappingSettings {
    pub fn new<I, S>(date_column: impl Into<String>, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            date_column: date_column.into(),
            metrics: metrics.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn namespaced(tag: &str, metric: &str) -> String {
    format!("{tag}_{metric}")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedSeries {
    entries: IndexMap<String, IndexMap<String, Cell>>,
}

impl MergedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct dates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, date: &str, metric: &str) -> Option<&Cell> {
        self.entries.get(date).and_then(|metrics| metrics.get(metric))
    }

    pub fn metrics_for(&self, date: &str) -> Option<&IndexMap<String, Cell>> {
        self.entries.get(date)
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Cell>)> {
        self.entries.iter().map(|(date, metrics)| (date.as_str(), metrics))
    }

    /// Union of metric names across all dates, in order of first appearance.
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: IndexSet<&str> = IndexSet::new();
        for metrics in self.entries.values() {
            names.extend(metrics.keys().map(String::as_str));
        }
        names.into_iter().map(str::to_string).collect()
    }

    pub fn insert(&mut self, date: impl Into<String>, metric: impl Into<String>, cell: Cell) {
        self.entries
            .entry(date.into())
            .or_default()
            .insert(metric.into(), cell);
    }
}

/// Folds `rows` into `accumulator` under `tag` and hands the accumulator back.
pub fn merge(
    rows: &[RawRow],
    settings: &MappingSettings,
    mut accumulator: MergedSeries,
    tag: &str,
) -> MergeResult<MergedSeries> {
    let keys: Vec<(&str, String)> = settings
        .metrics
        .iter()
        .map(|metric| (metric.as_str(), namespaced(tag, metric)))
        .collect();
    let dates_before = accumulator.len();

    for row in rows {
        let date = row
            .get(&settings.date_column)
            .ok_or_else(|| MergeError::missing_key(tag, &settings.date_column))?
            .as_display()
            .into_owned();
        for (metric, key) in &keys {
            let cell = row
                .get(metric)
                .ok_or_else(|| MergeError::missing_key(tag, metric))?;
            accumulator.insert(date.as_str(), key.as_str(), cell.clone());
        }
    }

    debug!(
        "Merged {} row(s) x {} metric(s) under '{tag}'; {} new date(s), {} total",
        rows.len(),
        keys.len(),
        accumulator.len() - dates_before,
        accumulator.len()
    );
    Ok(accumulator)
}
