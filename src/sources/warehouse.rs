//! Warehouse query results exported as a JSON array of row objects.

use log::warn;

use crate::{
    data::{Cell, RawRow},
    error::{MergeError, MergeResult},
};

/// Row cap applied to warehouse results, matching the query `LIMIT`.
pub const WAREHOUSE_ROW_LIMIT: usize = 10_000;

pub fn rows_from_results(results: &serde_json::Value) -> MergeResult<Vec<RawRow>> {
    let Some(records) = results.as_array() else {
        return Err(MergeError::malformed(
            "warehouse results must be a JSON array of row objects",
        ));
    };
    if records.len() > WAREHOUSE_ROW_LIMIT {
        warn!(
            "Warehouse returned {} row(s); only the first {WAREHOUSE_ROW_LIMIT} are used",
            records.len()
        );
    }

    records
        .iter()
        .take(WAREHOUSE_ROW_LIMIT)
        .enumerate()
        .map(|(idx, record)| {
            let object = record.as_object().ok_or_else(|| {
                MergeError::malformed(format!("warehouse row {} is not an object", idx + 1))
            })?;
            Ok(object
                .iter()
                .map(|(column, value)| (column.clone(), Cell::from_json(value)))
                .collect())
        })
        .collect()
}
