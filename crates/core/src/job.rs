//! The README-generation job entity and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{JobId, UserId};

/// Job execution status.
///
/// Transitions are monotonic and one-directional:
/// `Pending → Processing → {Completed | Failed}`. Terminal states are never
/// left.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, background work not yet started.
    Pending,
    /// Background pipeline is running.
    Processing,
    /// README produced; `generated_readme` is populated.
    Completed,
    /// Pipeline failed; `error` carries the message shown to the user.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One README-generation attempt.
///
/// # Invariants
/// - Status only moves forward; a terminal job never changes again.
/// - `generated_readme` is non-empty iff status is `Completed`.
/// - `error` is present iff status is `Failed`.
///
/// Created by the gateway in `Pending`; mutated only through the transition
/// methods below, which keep `updated_at` current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub repo_url: String,
    pub status: JobStatus,
    pub generated_readme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in `Pending` state.
    pub fn new(user_id: UserId, repo_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            user_id,
            repo_url: repo_url.into(),
            status: JobStatus::Pending,
            generated_readme: String::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `Pending → Processing`.
    pub fn mark_processing(&mut self) -> DomainResult<()> {
        self.transition(JobStatus::Pending, JobStatus::Processing)?;
        Ok(())
    }

    /// `Processing → Completed`, recording the generated text.
    pub fn mark_completed(&mut self, readme: impl Into<String>) -> DomainResult<()> {
        let readme = readme.into();
        if readme.is_empty() {
            return Err(DomainError::validation(
                "completed job must carry a non-empty README",
            ));
        }
        self.transition(JobStatus::Processing, JobStatus::Completed)?;
        self.generated_readme = readme;
        Ok(())
    }

    /// `Processing → Failed`, recording the user-visible error message.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> DomainResult<()> {
        let error = error.into();
        let error = if error.is_empty() {
            "An unknown error occurred.".to_string()
        } else {
            error
        };
        self.transition(JobStatus::Processing, JobStatus::Failed)?;
        self.error = Some(error);
        Ok(())
    }

    fn transition(&mut self, from: JobStatus, to: JobStatus) -> DomainResult<()> {
        if self.status != from {
            return Err(DomainError::invalid_transition(format!(
                "{} -> {} (job is {})",
                from, to, self.status
            )));
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
