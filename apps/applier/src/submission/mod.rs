//! Application Submitter: hands a job and its tailored resume to the
//! browser-automation tool.
//!
//! Submissions are side-effecting and not idempotent; the orchestrator calls
//! `submit` at most once per job per cycle.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::CollaboratorError;
use crate::models::job::JobPosting;

#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(&self, job: &JobPosting, artifact: &Path) -> Result<(), CollaboratorError>;
}

/// Runs an external automation command once per submission:
/// `<program> <args..> --url <job url> --resume <artifact>`, with `JOB_TITLE`
/// and `JOB_COMPANY` in its environment. Exit status 0 means submitted.
pub struct CommandSubmitter {
    program: String,
    args: Vec<String>,
}

impl CommandSubmitter {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// Splits a command line on whitespace; `None` when it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

#[async_trait]
impl ApplicationSubmitter for CommandSubmitter {
    async fn submit(&self, job: &JobPosting, artifact: &Path) -> Result<(), CollaboratorError> {
        debug!("Launching {} for {}", self.program, job.url);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--url")
            .arg(&job.url)
            .arg("--resume")
            .arg(artifact)
            .env("JOB_TITLE", &job.title)
            .env("JOB_COMPANY", &job.company)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("automation exited with {}", output.status));
        Err(CollaboratorError::Rejected(reason))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::job;

    fn shell(script: &str) -> CommandSubmitter {
        CommandSubmitter::new("sh".to_string(), vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let submitter = shell("exit 0");
        assert!(submitter.submit(&job("u1"), Path::new("r.txt")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_carries_last_stderr_line() {
        let submitter = shell("echo 'opening page' >&2; echo 'captcha detected' >&2; exit 3");
        let err = submitter
            .submit(&job("u1"), Path::new("r.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "captcha detected");
    }

    #[tokio::test]
    async fn test_receives_job_arguments() {
        // $0 is "--url" because of `sh -c`, so the url lands in $1.
        let submitter = shell("test \"$1\" = \"https://jobs.example.com/1\" && test \"$3\" = \"r.txt\"");
        let result = submitter
            .submit(&job("https://jobs.example.com/1"), Path::new("r.txt"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let submitter = CommandSubmitter::new("/nonexistent/apply-bot".to_string(), vec![]);
        let result = submitter.submit(&job("u1"), Path::new("r.txt")).await;
        assert!(matches!(result, Err(CollaboratorError::Io(_))));
    }

    #[test]
    fn test_from_command_line() {
        let submitter = CommandSubmitter::from_command_line("node scripts/apply.js --headless").unwrap();
        assert_eq!(submitter.program, "node");
        assert_eq!(submitter.args, vec!["scripts/apply.js", "--headless"]);
        assert!(CommandSubmitter::from_command_line("   ").is_none());
    }
}
