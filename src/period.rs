//! Pre/post period arithmetic for the impact estimator.
//!
//! Periods are inclusive row-index pairs into a [`crate::assemble::DenseTable`]
//! whose index starts at `from_date` and is continuous.

use serde::Serialize;

use crate::{
    dates::parse_iso_date,
    error::{MergeError, MergeResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: usize,
    pub end: usize,
}

impl Period {
    pub fn row_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn as_pair(&self) -> [usize; 2] {
        [self.start, self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImpactWindow {
    pub pre_period: Period,
    pub post_period: Period,
}

impl ImpactWindow {
    pub fn from_dates(from_date: &str, to_date: &str, event_date: &str) -> MergeResult<Self> {
        let from = parse_iso_date(from_date)?;
        let to = parse_iso_date(to_date)?;
        let event = parse_iso_date(event_date)?;
        if from > to {
            return Err(MergeError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if event <= from || event > to {
            return Err(MergeError::EventOutOfRange {
                from: from.to_string(),
                to: to.to_string(),
                event: event.to_string(),
            });
        }

        let pre_delta = (event - from).num_days() as usize;
        let post_delta = (to - event).num_days() as usize;
        Ok(Self {
            pre_period: Period {
                start: 0,
                end: pre_delta - 1,
            },
            post_period: Period {
                start: pre_delta,
                end: pre_delta + post_delta,
            },
        })
    }

    /// Total rows covered; equals the dense table's row count.
    pub fn span(&self) -> usize {
        self.post_period.end + 1
    }
}
