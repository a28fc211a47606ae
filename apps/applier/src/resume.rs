//! Base resume loading. Text formats are read as-is; PDFs go through
//! `pdf-extract` on the blocking pool.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Resumes with less extractable text than this are treated as unreadable.
pub const MIN_RESUME_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Failed to read resume {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to extract text from {path}: {message}")]
    Extract { path: PathBuf, message: String },

    #[error("Unsupported resume format '{0}' (expected .txt, .md or .pdf)")]
    UnsupportedFormat(String),

    #[error("Resume {0} is too short or unreadable")]
    TooShort(PathBuf),
}

/// The candidate's base resume for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub path: PathBuf,
    pub text: String,
}

impl ResumeDocument {
    pub async fn load(path: &Path) -> Result<Self, ResumeError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let text = match extension.as_str() {
            "txt" | "md" => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ResumeError::Read {
                    path: path.to_path_buf(),
                    source,
                })?,
            "pdf" => extract_pdf(path).await?,
            other => return Err(ResumeError::UnsupportedFormat(other.to_string())),
        };

        if text.trim().chars().count() < MIN_RESUME_CHARS {
            return Err(ResumeError::TooShort(path.to_path_buf()));
        }

        debug!("Loaded resume {} ({} chars)", path.display(), text.len());
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }
}

async fn extract_pdf(path: &Path) -> Result<String, ResumeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ResumeError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ResumeError::Extract {
            path: owned.clone(),
            message: e.to_string(),
        })?
        .map_err(|e| ResumeError::Extract {
            path: owned,
            message: e.to_string(),
        })
}
