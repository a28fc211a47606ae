//! PostgreSQL-backed `ApplicationStore`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::store::{ApplicationStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS applications (
        id          BIGSERIAL PRIMARY KEY,
        timestamp   TIMESTAMPTZ NOT NULL DEFAULT now(),
        title       TEXT NOT NULL,
        company     TEXT NOT NULL,
        location    TEXT NOT NULL DEFAULT '',
        url         TEXT NOT NULL,
        resume_path TEXT NOT NULL DEFAULT '',
        status      TEXT NOT NULL CHECK (status IN ('success', 'failed', 'test'))
    )
"#;

const CREATE_URL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS applications_url_status_idx ON applications (url, status)";

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_URL_INDEX).execute(&self.pool).await?;
        debug!("applications schema ensured");
        Ok(())
    }

    async fn has_succeeded(&self, url: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE url = $1 AND status = 'success')",
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn failure_count(&self, url: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE url = $1 AND status = 'failed'",
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Append-only INSERT. Never UPDATE existing rows.
    async fn insert(&self, record: &ApplicationRecord) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO applications
                (timestamp, title, company, location, url, resume_path, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.title)
        .bind(&record.company)
        .bind(&record.location)
        .bind(&record.url)
        .bind(&record.resume_path)
        .bind(record.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ApplicationRow>(
                    r#"
                    SELECT id, timestamp, title, company, location, url, resume_path, status
                    FROM applications
                    WHERE status = $1
                    ORDER BY timestamp DESC, id DESC
                    "#,
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ApplicationRow>(
                    r#"
                    SELECT id, timestamp, title, company, location, url, resume_path, status
                    FROM applications
                    ORDER BY timestamp DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn count(&self, status: Option<ApplicationStatus>) -> Result<i64, StoreError> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM applications")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
