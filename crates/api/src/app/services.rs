use std::sync::Arc;

use repodoc_ai::{GeminiClient, ReadmeGenerator};
use repodoc_auth::{InMemoryUserStore, UserStore};
use repodoc_github::{GithubClient, RepoHost};
use repodoc_jobs::{InMemoryJobStore, JobRunner, JobStore};

/// External-service configuration for production wiring.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Token attached to repository-host requests (optional but strongly
    /// recommended: unauthenticated rate limits are tight).
    pub github_token: Option<String>,
    /// API key for the text-generation provider.
    pub gemini_api_key: String,
}

/// Shared application services: stores plus the background job runner.
pub struct AppServices {
    pub jobs: Arc<dyn JobStore>,
    pub users: Arc<dyn UserStore>,
    pub runner: JobRunner,
}

impl AppServices {
    /// Wire services from explicit parts (used by tests with fakes).
    pub fn new(
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
        host: Arc<dyn RepoHost>,
        generator: Arc<dyn ReadmeGenerator>,
    ) -> Self {
        let runner = JobRunner::new(jobs.clone(), users.clone(), host, generator);
        Self {
            jobs,
            users,
            runner,
        }
    }

    /// Production wiring: in-memory stores, GitHub host, Gemini generator.
    pub fn build(config: ServiceConfig) -> Self {
        let jobs: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        let host: Arc<dyn RepoHost> = Arc::new(GithubClient::new(config.github_token));
        let generator: Arc<dyn ReadmeGenerator> = Arc::new(GeminiClient::new(config.gemini_api_key));
        Self::new(jobs, users, host, generator)
    }
}
