use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::errors::CollaboratorError;
use crate::models::job::{JobPosting, SourceTag};
use crate::sources::{parse_postings, JobSource};

/// A JSON job feed over HTTP.
pub struct FeedSource {
    name: String,
    url: String,
    platform: SourceTag,
    client: Client,
}

impl FeedSource {
    pub fn new(name: String, url: String, platform: SourceTag, client: Client) -> Self {
        Self {
            name,
            url,
            platform,
            client,
        }
    }
}

#[async_trait]
impl JobSource for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<JobPosting>, CollaboratorError> {
        let payload: Value = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_postings(&payload, self.platform, &self.name)
    }
}
