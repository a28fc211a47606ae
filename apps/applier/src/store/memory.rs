//! In-memory `ApplicationStore` used by tests. Append-only like the real table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::store::{ApplicationStore, StoreError};

pub struct MemoryStore {
    rows: Mutex<Vec<ApplicationRow>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// Simulates the database going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<ApplicationRow> {
        self.rows.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn push(&self, record: &ApplicationRecord) -> i64 {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(ApplicationRow {
            id,
            timestamp: record.timestamp,
            title: record.title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            url: record.url.clone(),
            resume_path: record.resume_path.clone(),
            status: record.status.as_str().to_string(),
        });
        id
    }

    fn matching(&self, url: Option<&str>, status: Option<ApplicationStatus>) -> Vec<ApplicationRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| url.map_or(true, |u| r.url == u))
            .filter(|r| status.map_or(true, |s| r.status == s.as_str()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn has_succeeded(&self, url: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(!self
            .matching(Some(url), Some(ApplicationStatus::Success))
            .is_empty())
    }

    async fn failure_count(&self, url: &str) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.matching(Some(url), Some(ApplicationStatus::Failed)).len() as i64)
    }

    async fn insert(&self, record: &ApplicationRecord) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.push(record))
    }

    async fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        self.check()?;
        let mut rows = self.matching(None, status);
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn count(&self, status: Option<ApplicationStatus>) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.matching(None, status).len() as i64)
    }
}
