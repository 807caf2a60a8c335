//! Failure taxonomy of the merge and assembly core.
//!
//! Every variant renders a distinct, user-facing message so that failures
//! raised while building the table can be told apart from failures of the
//! estimator that later consumes it.

use thiserror::Error;

pub type MergeResult<T> = std::result::Result<T, MergeError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A source batch is empty, unreadable, or has no identifiable date column.
    #[error("{0}")]
    MalformedData(String),

    /// A date value does not match the expected format.
    #[error("date value '{value}' does not match the expected '{expected}' format")]
    DateFormatError { value: String, expected: String },

    /// The requested target metric is not among the merged columns.
    #[error("target metric '{0}' is not present in the merged data; re-select the target metric")]
    TargetColumnMissing(String),

    /// A declared metric (or the date column) is absent from a source row.
    #[error("column '{column}' is missing from a '{tag}' source row")]
    MissingKey { tag: String, column: String },

    /// A declared metric was classified as non-numeric.
    #[error("column '{column}' in the '{tag}' source is not numeric")]
    NonNumericMetric { tag: String, column: String },

    #[error("start date {from} is after end date {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("No data in datasources!")]
    EmptyMerge,

    #[error("event date {event} must fall after {from} and on or before {to}")]
    EventOutOfRange {
        from: String,
        to: String,
        event: String,
    },
}

impl MergeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        MergeError::MalformedData(message.into())
    }

    pub(crate) fn date_format(value: impl Into<String>, expected: &str) -> Self {
        MergeError::DateFormatError {
            value: value.into(),
            expected: expected.to_string(),
        }
    }

    pub(crate) fn missing_key(tag: &str, column: &str) -> Self {
        MergeError::MissingKey {
            tag: tag.to_string(),
            column: column.to_string(),
        }
    }
}
