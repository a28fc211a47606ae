//! Application Record Store: the durable, append-only ledger of attempts.
//!
//! `ApplicationStore` is the narrow persistence seam (PostgreSQL in production,
//! in-memory in tests). `RecordStore` layers the ledger contract on top of it:
//! append-then-notify sequencing, dedupe queries and the CSV snapshot.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::notify::{BatchReport, Notifier};

pub mod export;
#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Snapshot write failed: {0}")]
    Snapshot(#[from] std::io::Error),
}

/// Persistence seam for the `applications` table.
///
/// Implementations only ever INSERT; no row is updated or deleted.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Ensures the schema exists. Safe to call on every start and every cycle.
    async fn initialize(&self) -> Result<(), StoreError>;

    async fn has_succeeded(&self, url: &str) -> Result<bool, StoreError>;

    async fn failure_count(&self, url: &str) -> Result<i64, StoreError>;

    /// Appends one attempt row and returns its id.
    async fn insert(&self, record: &ApplicationRecord) -> Result<i64, StoreError>;

    /// Rows newest first, optionally filtered by status.
    async fn list(&self, status: Option<ApplicationStatus>)
        -> Result<Vec<ApplicationRow>, StoreError>;

    async fn count(&self, status: Option<ApplicationStatus>) -> Result<i64, StoreError>;
}

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendReceipt {
    pub id: i64,
    /// False when the attempt notification failed; the row is still durable.
    pub notified: bool,
}

/// Result of a snapshot export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub rows: usize,
    pub csv: String,
}

/// The ledger used by the orchestrator and the HTTP surface.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn Notifier>,
}

impl RecordStore {
    pub fn new(inner: Arc<dyn ApplicationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.inner.initialize().await
    }

    pub async fn has_succeeded(&self, url: &str) -> Result<bool, StoreError> {
        self.inner.has_succeeded(url).await
    }

    pub async fn failure_count(&self, url: &str) -> Result<i64, StoreError> {
        self.inner.failure_count(url).await
    }

    pub async fn success_count(&self) -> Result<i64, StoreError> {
        self.inner.count(Some(ApplicationStatus::Success)).await
    }

    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        self.inner.list(status).await
    }

    /// Durable write, then the attempt notification.
    ///
    /// A notification failure is logged and reported in the receipt; it never
    /// undoes the write.
    pub async fn append(&self, record: &ApplicationRecord) -> Result<AppendReceipt, StoreError> {
        let id = self.inner.insert(record).await?;
        info!(
            "Recorded application {id}: {} at {} -> {}",
            record.title, record.company, record.status
        );

        let notified = match self.notifier.notify_attempt(record).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification for application {id} failed: {e}");
                false
            }
        };

        Ok(AppendReceipt { id, notified })
    }

    /// Renders rows with the given status (all when `None`) as CSV, newest first.
    pub async fn render_csv(&self, status: Option<ApplicationStatus>) -> Result<String, StoreError> {
        let rows = self.inner.list(status).await?;
        Ok(export::render_csv(&rows))
    }

    /// Writes all `success` rows, newest first, to `destination`.
    pub async fn export_successful(&self, destination: &Path) -> Result<ExportSummary, StoreError> {
        let rows = self.inner.list(Some(ApplicationStatus::Success)).await?;
        let csv = export::render_csv(&rows);
        export::write_snapshot(destination, &csv).await?;
        info!(
            "Exported {} successful applications to {}",
            rows.len(),
            destination.display()
        );
        Ok(ExportSummary {
            rows: rows.len(),
            csv,
        })
    }

    /// Sends the periodic batch message carrying the snapshot.
    pub async fn notify_batch(&self, report: &BatchReport) -> bool {
        match self.notifier.notify_batch(report).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Batch notification failed: {e}");
                false
            }
        }
    }
}
