use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::job::JobPosting;

/// Outcome stored with each attempt row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Success,
    Failed,
    /// Dry-run pass: everything except the submission itself.
    Test,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Success => "success",
            ApplicationStatus::Failed => "failed",
            ApplicationStatus::Test => "test",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(ApplicationStatus::Success),
            "failed" => Ok(ApplicationStatus::Failed),
            "test" => Ok(ApplicationStatus::Test),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// A new attempt to append. The store assigns `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRecord {
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub resume_path: String,
    pub status: ApplicationStatus,
}

impl ApplicationRecord {
    pub fn for_attempt(job: &JobPosting, artifact: &Path, status: ApplicationStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location_or_empty().to_string(),
            url: job.url.clone(),
            resume_path: artifact.display().to_string(),
            status,
        }
    }
}

/// A persisted attempt row, as read back from `applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub resume_path: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::SourceTag;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "SUCCESS".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Success
        );
        assert_eq!(
            " failed ".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Failed
        );
        assert!("pending".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&ApplicationStatus::Test).unwrap();
        assert_eq!(json, "\"test\"");
    }

    #[test]
    fn test_record_for_attempt_copies_job_fields() {
        let job = JobPosting {
            title: "Data Engineer".to_string(),
            company: "Initech".to_string(),
            location: None,
            description: String::new(),
            url: "https://jobs.example.com/42".to_string(),
            source: SourceTag::Workday,
        };
        let record = ApplicationRecord::for_attempt(
            &job,
            Path::new("out/resume_initech_data_engineer.txt"),
            ApplicationStatus::Failed,
        );
        assert_eq!(record.url, job.url);
        assert_eq!(record.location, "");
        assert_eq!(record.resume_path, "out/resume_initech_data_engineer.txt");
        assert_eq!(record.status, ApplicationStatus::Failed);
    }
}
