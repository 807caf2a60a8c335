//! Spreadsheet value ranges (`{"values": [[header, ...], [row, ...]]}`).

use log::debug;
use serde::Deserialize;

use crate::{
    data::{Cell, RawRow},
    error::{MergeError, MergeResult},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// The first grid row names the columns. The API drops trailing empty
/// cells, so short rows are padded with blanks.
pub fn rows_from_grid(range: &ValueRange) -> MergeResult<Vec<RawRow>> {
    let Some((header_row, data)) = range.values.split_first() else {
        return Err(MergeError::malformed("spreadsheet range is empty"));
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| Cell::from_json(cell).as_display().into_owned())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(MergeError::malformed("spreadsheet header row is empty"));
    }

    let mut padded = 0usize;
    let rows = data
        .iter()
        .map(|values| {
            if values.len() < headers.len() {
                padded += 1;
            }
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let cell = values.get(idx).map(Cell::from_json).unwrap_or(Cell::Null);
                    (header.clone(), cell)
                })
                .collect::<RawRow>()
        })
        .collect::<Vec<_>>();
    if padded > 0 {
        debug!("Padded {padded} short spreadsheet row(s)");
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_row_names_columns_and_short_rows_pad() {
        let range: ValueRange = serde_json::from_value(json!({
            "values": [
                ["date", "visits", "notes"],
                ["2024-01-01", "10", "launch"],
                ["2024-01-02", "12"]
            ]
        }))
        .unwrap();
        let rows = rows_from_grid(&range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("notes"), Some(&Cell::text("launch")));
        assert_eq!(rows[1].get("notes"), Some(&Cell::Null));
        assert_eq!(rows[1].columns().count(), 3);
    }

    #[test]
    fn empty_range_is_malformed() {
        assert!(matches!(
            rows_from_grid(&ValueRange::default()),
            Err(MergeError::MalformedData(_))
        ));
    }
}
