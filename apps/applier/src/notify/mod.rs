//! Outbound notifications: one message per recorded attempt, plus a periodic
//! batch message carrying the CSV snapshot.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::errors::CollaboratorError;
use crate::models::application::{ApplicationRecord, ApplicationStatus};

pub const BATCH_SUBJECT: &str = "CSV Report: Successful Job Applications";

/// Snapshot handed to `Notifier::notify_batch`.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub filename: String,
    pub csv: String,
    pub success_count: i64,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_attempt(&self, record: &ApplicationRecord) -> Result<(), CollaboratorError>;

    async fn notify_batch(&self, report: &BatchReport) -> Result<(), CollaboratorError>;
}

/// `Success - Applied to: <title> at <company>` and friends.
pub fn attempt_subject(record: &ApplicationRecord) -> String {
    let outcome = match record.status {
        ApplicationStatus::Success => "Success",
        ApplicationStatus::Failed => "Failure",
        ApplicationStatus::Test => "Test",
    };
    format!(
        "{outcome} - Applied to: {} at {}",
        record.title, record.company
    )
}

pub fn attempt_body(record: &ApplicationRecord) -> String {
    format!(
        "Job Title: {}\nCompany: {}\nLocation: {}\nURL: {}\nResume: {}\nStatus: {}\n",
        record.title,
        record.company,
        record.location,
        record.url,
        record.resume_path,
        record.status.as_str().to_uppercase()
    )
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    subject: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<WebhookAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct WebhookAttachment<'a> {
    filename: &'a str,
    content_type: &'static str,
    content: &'a str,
}

/// Posts each message as JSON to a webhook (mail relay, chat integration, ...).
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
        })
    }

    async fn post(&self, message: &WebhookMessage<'_>) -> Result<(), CollaboratorError> {
        let response = self.client.post(&self.url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::rejected(format!(
                "notification webhook returned {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_attempt(&self, record: &ApplicationRecord) -> Result<(), CollaboratorError> {
        self.post(&WebhookMessage {
            subject: attempt_subject(record),
            body: attempt_body(record),
            attachment: None,
        })
        .await
    }

    async fn notify_batch(&self, report: &BatchReport) -> Result<(), CollaboratorError> {
        self.post(&WebhookMessage {
            subject: BATCH_SUBJECT.to_string(),
            body: format!(
                "Attached is your latest job application report ({} successful applications).",
                report.success_count
            ),
            attachment: Some(WebhookAttachment {
                filename: &report.filename,
                content_type: "text/csv",
                content: &report.csv,
            }),
        })
        .await?;
        info!("Batch report sent ({} successes)", report.success_count);
        Ok(())
    }
}

/// Used when no webhook is configured: the messages go to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_attempt(&self, record: &ApplicationRecord) -> Result<(), CollaboratorError> {
        info!("{}", attempt_subject(record));
        Ok(())
    }

    async fn notify_batch(&self, report: &BatchReport) -> Result<(), CollaboratorError> {
        info!(
            "{BATCH_SUBJECT}: {} successes, {} bytes in {}",
            report.success_count,
            report.csv.len(),
            report.filename
        );
        Ok(())
    }
}
