//! Explicit per-request session context.
//!
//! A [`Session`] holds the batches a user uploaded before asking for a
//! report. Sessions are created and expired by a [`SessionStore`] owned by
//! the caller; nothing in the merge core reaches for process-wide state.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use log::{debug, info};
use uuid::Uuid;

use crate::{
    classify::{ColumnClassification, classify},
    data::RawRow,
    dates::{DateRange, date_range, normalize_dates},
    error::MergeResult,
};

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// A classified, range-checked upload ready to merge.
#[derive(Debug, Clone)]
pub struct UploadedSource {
    pub rows: Vec<RawRow>,
    pub classification: ColumnClassification,
    pub range: DateRange,
}

impl UploadedSource {
    /// Classifies the batch, checks its date column and range, and, when
    /// `convert_dates` is set, rewrites alternate-format dates to ISO first.
    pub fn prepare(mut rows: Vec<RawRow>, convert_dates: bool) -> MergeResult<Self> {
        let classification = classify(&mut rows)?;
        let date_column = classification.require_date_column()?.to_string();
        if convert_dates {
            normalize_dates(&mut rows, &date_column)?;
        }
        let range = date_range(&rows, &date_column, false)?;
        range.ensure_iso()?;
        Ok(Self {
            rows,
            classification,
            range,
        })
    }

    pub fn date_column(&self) -> &str {
        self.classification.date_column.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    ttl: Duration,
    uploads: IndexMap<String, UploadedSource>,
}

impl Session {
    pub fn new(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            ttl,
            uploads: IndexMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + self.ttl
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn store_upload(&mut self, name: impl Into<String>, upload: UploadedSource) {
        let name = name.into();
        debug!(
            "Session {} stores upload '{name}' ({} row(s), {}..={})",
            self.id,
            upload.rows.len(),
            upload.range.min_date,
            upload.range.max_date
        );
        self.uploads.insert(name, upload);
    }

    pub fn upload(&self, name: &str) -> Option<&UploadedSource> {
        self.uploads.get(name)
    }

    pub fn remove_upload(&mut self, name: &str) -> Option<UploadedSource> {
        self.uploads.shift_remove(name)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: HashMap<Uuid, Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self, now: DateTime<Utc>) -> Uuid {
        let session = Session::new(now, self.ttl);
        let id = session.id();
        self.sessions.insert(id, session);
        info!("Created session {id} (expires {})", now + self.ttl);
        id
    }

    /// Live session for `id`; an expired session is dropped and not returned.
    pub fn get_mut(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<&mut Session> {
        if self.sessions.get(&id).is_some_and(|s| s.is_expired(now)) {
            self.sessions.remove(&id);
            debug!("Session {id} expired");
            return None;
        }
        self.sessions.get_mut(&id)
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;

    fn upload_rows(dates: &[&str]) -> Vec<RawRow> {
        dates
            .iter()
            .map(|d| [("Date", *d), ("orders", "")].into_iter().collect())
            .collect()
    }

    #[test]
    fn sessions_expire_after_ttl() {
        let start = Utc::now();
        let mut store = SessionStore::new(Duration::minutes(5));
        let id = store.create(start);
        assert!(store.get_mut(id, start + Duration::minutes(4)).is_some());
        assert!(store.get_mut(id, start + Duration::minutes(5)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_only_expired_sessions() {
        let start = Utc::now();
        let mut store = SessionStore::new(Duration::minutes(10));
        store.create(start);
        let late = store.create(start + Duration::minutes(8));
        assert_eq!(store.purge_expired(start + Duration::minutes(12)), 1);
        assert!(store.get_mut(late, start + Duration::minutes(12)).is_some());
    }

    #[test]
    fn prepared_upload_is_classified_and_ranged() {
        let upload = UploadedSource::prepare(upload_rows(&["2024-01-03", "2024-01-01"]), false)
            .unwrap();
        assert_eq!(upload.date_column(), "Date");
        assert_eq!(upload.classification.numeric_columns, vec!["orders"]);
        assert_eq!(upload.range.min_date, "2024-01-01");

        let mut session = Session::new(Utc::now(), Duration::minutes(1));
        session.store_upload("csv", upload);
        assert!(session.upload("csv").is_some());
        assert!(session.remove_upload("csv").is_some());
    }

    #[test]
    fn converted_upload_dates_become_iso() {
        let upload = UploadedSource::prepare(upload_rows(&["Jan 05 2024"]), true).unwrap();
        assert_eq!(upload.range.max_date, "2024-01-05");
    }

    #[test]
    fn non_iso_upload_dates_are_rejected() {
        assert!(matches!(
            UploadedSource::prepare(upload_rows(&["05/01/2024"]), false),
            Err(MergeError::DateFormatError { .. })
        ));
    }
}
