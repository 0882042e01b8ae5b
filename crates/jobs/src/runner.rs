//! The background job lifecycle runner.
//!
//! One runner instance serves the whole process; each accepted job becomes an
//! independent detached task with its own error boundary. Nothing in here
//! ever reaches the creating HTTP request — failures become terminal job
//! state that clients discover by polling.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use repodoc_ai::{GenerationError, ReadmeGenerator};
use repodoc_auth::UserStore;
use repodoc_core::{Job, JobId, RepoRef, assemble_context, select_key_files};
use repodoc_github::{FetchError, RepoHost};

use crate::store::JobStore;

/// A failure of one pipeline step, routed uniformly to the job's failure
/// path. The display text is exactly what the polling client will see.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Could not find any key files (like package.json) in this repo.")]
    NoKeyFiles,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Drives accepted jobs through `processing → {completed|failed}`.
#[derive(Clone)]
pub struct JobRunner {
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserStore>,
    host: Arc<dyn RepoHost>,
    generator: Arc<dyn ReadmeGenerator>,
}

impl JobRunner {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
        host: Arc<dyn RepoHost>,
        generator: Arc<dyn ReadmeGenerator>,
    ) -> Self {
        Self {
            jobs,
            users,
            host,
            generator,
        }
    }

    /// Fire-and-forget continuation for an accepted job.
    ///
    /// The returned handle is only awaited by tests; the gateway drops it, so
    /// the task outlives the originating request without implicit
    /// cancellation.
    pub fn spawn(&self, job: Job, repo: RepoRef) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move {
            runner.run(job, repo).await;
        })
    }

    /// Run one job to a terminal state.
    pub async fn run(&self, mut job: Job, repo: RepoRef) {
        let job_id = job.id;

        if let Err(e) = job.mark_processing() {
            error!(%job_id, error = %e, "job was not pending; refusing to run");
            return;
        }
        if let Err(e) = self.jobs.update(&job).await {
            error!(%job_id, error = %e, "failed to persist processing state");
            return;
        }

        match self.execute(job_id, &repo).await {
            Ok(readme) => self.complete(&mut job, readme).await,
            Err(step_error) => self.fail(&mut job, step_error).await,
        }
    }

    /// The fetch → select → assemble → generate pipeline. Any step error
    /// bubbles out of here and lands on the job's failure path.
    async fn execute(&self, job_id: JobId, repo: &RepoRef) -> Result<String, JobError> {
        let tree = self.host.fetch_tree(repo).await?;

        let paths = select_key_files(&tree);
        info!(%job_id, count = paths.len(), "selected key files");
        if paths.is_empty() {
            return Err(JobError::NoKeyFiles);
        }

        // Per-file fetches run concurrently; results are reassembled in the
        // original path order. A failed or panicked fetch is absorbed as
        // "no content" for that single path.
        let mut fetches = Vec::with_capacity(paths.len());
        for path in &paths {
            let host = Arc::clone(&self.host);
            let repo = repo.clone();
            let path = path.clone();
            fetches.push(tokio::spawn(
                async move { host.fetch_file(&repo, &path).await },
            ));
        }

        let mut contents = Vec::with_capacity(fetches.len());
        for fetch in fetches {
            contents.push(fetch.await.unwrap_or(None));
        }

        let context = assemble_context(&paths, &contents);
        debug!(%job_id, context_len = context.len(), "assembled generation context");

        let readme = self.generator.generate(&context).await?;
        Ok(readme)
    }

    async fn complete(&self, job: &mut Job, readme: String) {
        let job_id = job.id;

        if let Err(e) = job.mark_completed(readme) {
            error!(%job_id, error = %e, "could not mark job completed");
            return;
        }
        if let Err(e) = self.jobs.update(job).await {
            error!(%job_id, error = %e, "failed to persist completed state");
            return;
        }

        // Quota is consumed only on success, after the terminal write.
        match self.users.consume_generation(job.user_id).await {
            Ok(true) => info!(%job_id, user_id = %job.user_id, "job completed; generation consumed"),
            Ok(false) => {
                warn!(%job_id, user_id = %job.user_id, "job completed but no quota left to consume")
            }
            Err(e) => error!(%job_id, error = %e, "failed to consume generation quota"),
        }
    }

    async fn fail(&self, job: &mut Job, step_error: JobError) {
        let job_id = job.id;
        warn!(%job_id, error = %step_error, "job processing failed");

        if let Err(e) = job.mark_failed(step_error.to_string()) {
            error!(%job_id, error = %e, "could not mark job failed");
            return;
        }
        if let Err(e) = self.jobs.update(job).await {
            error!(%job_id, error = %e, "failed to persist failed state");
        }
    }
}
