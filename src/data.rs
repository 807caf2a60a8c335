use std::{borrow::Cow, fmt};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A single source cell. Connectors hand over either text or already-typed numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_display(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
            Cell::Null => Cow::Borrowed(""),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
            Cell::Null => true,
        }
    }

    /// Converts a JSON value from a warehouse or API export into a cell.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Null => serializer.serialize_none(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One record from a connector: column name to cell, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    cells: IndexMap<String, Cell>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut Cell> {
        self.cells.get_mut(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Option<Cell> {
        self.cells.insert(column.into(), cell.into())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Tokens treated as "no value" when a cell is coerced to a number.
const NULL_TOKENS: &[&str] = &["", "nan", "null", "none", "nat"];

/// Total numeric coercion: blank, null-like, non-finite and unparseable cells become zero.
pub fn coerce_numeric(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Null => 0.0,
        Cell::Text(raw) => {
            let trimmed = raw.trim();
            if NULL_TOKENS.contains(&trimmed.to_ascii_lowercase().as_str()) {
                return 0.0;
            }
            trimmed.parse::<f64>().unwrap_or(0.0)
        }
    };
    if value.is_finite() { value } else { 0.0 }
}

/// True when the text, with every `.` removed, is a non-empty run of ASCII digits.
pub fn is_digit_token(value: &str) -> bool {
    let mut saw_digit = false;
    for ch in value.chars().filter(|c| *c != '.') {
        if !ch.is_ascii_digit() {
            return false;
        }
        saw_digit = true;
    }
    saw_digit
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numeric_is_total() {
        assert_eq!(coerce_numeric(&Cell::text("12.5")), 12.5);
        assert_eq!(coerce_numeric(&Cell::text(" 7 ")), 7.0);
        assert_eq!(coerce_numeric(&Cell::text("")), 0.0);
        assert_eq!(coerce_numeric(&Cell::text("NaN")), 0.0);
        assert_eq!(coerce_numeric(&Cell::text("None")), 0.0);
        assert_eq!(coerce_numeric(&Cell::text("abc")), 0.0);
        assert_eq!(coerce_numeric(&Cell::Null), 0.0);
        assert_eq!(coerce_numeric(&Cell::Number(f64::NAN)), 0.0);
        assert_eq!(coerce_numeric(&Cell::Number(f64::INFINITY)), 0.0);
        assert_eq!(coerce_numeric(&Cell::Number(-3.0)), -3.0);
    }

    #[test]
    fn digit_token_ignores_dots_only() {
        assert!(is_digit_token("20.5"));
        assert!(is_digit_token("1.000.000"));
        assert!(!is_digit_token("-5"));
        assert!(!is_digit_token("1e5"));
        assert!(!is_digit_token("."));
        assert!(!is_digit_token(""));
    }

    #[test]
    fn number_cells_display_without_trailing_zero() {
        assert_eq!(Cell::Number(42.0).as_display(), "42");
        assert_eq!(Cell::Number(0.25).as_display(), "0.25");
        assert_eq!(Cell::Null.as_display(), "");
    }

    #[test]
    fn json_values_map_to_cells() {
        assert_eq!(Cell::from_json(&serde_json::json!(3)), Cell::Number(3.0));
        assert_eq!(Cell::from_json(&serde_json::json!(null)), Cell::Null);
        assert_eq!(Cell::from_json(&serde_json::json!(true)), Cell::text("true"));
        assert_eq!(Cell::from_json(&serde_json::json!("x")), Cell::text("x"));
    }

    #[test]
    fn raw_row_keeps_column_order() {
        let row: RawRow = [("date", "2024-01-01"), ("clicks", "5"), ("cost", "1")]
            .into_iter()
            .collect();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["date", "clicks", "cost"]);
    }
}
