//! Job storage implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use repodoc_core::{Job, JobId};

/// Job store error.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Job store abstraction.
///
/// Jobs are never deleted by this system; retention is an external concern.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a newly accepted job.
    async fn insert(&self, job: Job) -> Result<(), JobStoreError>;

    /// Look up a job by id.
    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError>;

    /// Persist a state transition (full-row update).
    async fn update(&self, job: &Job) -> Result<(), JobStoreError>;
}

/// In-memory job store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: Job) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(JobStoreError::AlreadyExists(job.id));
        }
        jobs.insert(job.id, job);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&job.id) {
            return Err(JobStoreError::NotFound(job.id));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repodoc_core::{JobStatus, UserId};

    fn sample_job() -> Job {
        Job::new(UserId::new(), "https://github.com/o/r")
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = InMemoryJobStore::new();
        let job = sample_job();
        let id = job.id;

        store.insert(job.clone()).await.unwrap();
        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded, job);
    }

    #[tokio::test]
    async fn double_insert_is_rejected() {
        let store = InMemoryJobStore::new();
        let job = sample_job();

        store.insert(job.clone()).await.unwrap();
        assert!(matches!(
            store.insert(job).await,
            Err(JobStoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn update_persists_transitions() {
        let store = InMemoryJobStore::new();
        let mut job = sample_job();
        let id = job.id;
        store.insert(job.clone()).await.unwrap();

        job.mark_processing().unwrap();
        store.update(&job).await.unwrap();

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn update_of_unknown_job_errors() {
        let store = InMemoryJobStore::new();
        let job = sample_job();
        assert!(matches!(
            store.update(&job).await,
            Err(JobStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_of_unknown_job_is_none() {
        let store = InMemoryJobStore::new();
        assert!(store.get(JobId::new()).await.unwrap().is_none());
    }
}
