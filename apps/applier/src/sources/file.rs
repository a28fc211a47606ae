use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CollaboratorError;
use crate::models::job::{JobPosting, SourceTag};
use crate::sources::{parse_postings, JobSource};

/// Postings saved to a local JSON file (exports, hand-curated lists).
pub struct FileSource {
    name: String,
    path: PathBuf,
    platform: SourceTag,
}

impl FileSource {
    pub fn new(name: String, path: PathBuf, platform: SourceTag) -> Self {
        Self {
            name,
            path,
            platform,
        }
    }
}

#[async_trait]
impl JobSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<JobPosting>, CollaboratorError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let payload: Value = serde_json::from_str(&raw)?;
        parse_postings(&payload, self.platform, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_postings_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        tokio::fs::write(
            &path,
            r#"[{"title": "ML Engineer", "company": "Globex", "url": "https://globex.example.com/1", "location": "NYC"}]"#,
        )
        .await
        .unwrap();

        let source = FileSource::new("saved".to_string(), path, SourceTag::Workday);
        let jobs = source.fetch().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Globex");
        assert_eq!(jobs[0].source, SourceTag::Workday);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = FileSource::new(
            "saved".to_string(),
            PathBuf::from("/nonexistent/jobs.json"),
            SourceTag::Custom,
        );
        assert!(matches!(source.fetch().await, Err(CollaboratorError::Io(_))));
    }
}
