//! Source normalizers.
//!
//! Each connector payload is turned into [`RawRow`]s carrying one date
//! column plus metric columns, so that every source feeds the same
//! [`crate::merge::merge`] call. Sources with sub-daily or per-category
//! granularity (the ad platform, the grouped benchmark feed) aggregate to
//! one row per date here, before the merge.

pub mod ads;
pub mod analytics;
pub mod grouped;
pub mod sheet;
pub mod upload;
pub mod warehouse;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::RawRow;

/// Date column name used by normalizers that build their own rows.
pub const NORMALIZED_DATE_COLUMN: &str = "date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Ads,
    Analytics,
    Upload,
    Sheet,
    Warehouse,
    Benchmark,
}

impl SourceKind {
    /// Merge order used by the report pipeline.
    pub const MERGE_ORDER: [SourceKind; 6] = [
        SourceKind::Ads,
        SourceKind::Analytics,
        SourceKind::Upload,
        SourceKind::Sheet,
        SourceKind::Warehouse,
        SourceKind::Benchmark,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SourceKind::Ads => "gads",
            SourceKind::Analytics => "ga4",
            SourceKind::Upload => "csv",
            SourceKind::Sheet => "gsheet",
            SourceKind::Warehouse => "bq",
            SourceKind::Benchmark => "bench",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Builds a normalized row from a date and ordered metric values.
pub(crate) fn dated_row<I, K>(date: &str, metrics: I) -> RawRow
where
    I: IntoIterator<Item = (K, f64)>,
    K: Into<String>,
{
    let mut row = RawRow::new();
    row.insert(NORMALIZED_DATE_COLUMN, date);
    for (name, value) in metrics {
        row.insert(name, value);
    }
    row
}
