//! `repodoc-github` — repository host access (tree listing + file contents).
//!
//! Failure granularity matters here: a tree that cannot be listed kills the
//! whole job, while a single unreadable file is absorbed as "no content" so
//! the rest of the batch still flows.

use async_trait::async_trait;
use thiserror::Error;

use repodoc_core::{RepoRef, TreeEntry};

mod client;

pub use client::GithubClient;

/// Errors surfaced by the repository host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network, auth, or not-found while listing — no partial result.
    #[error("Could not fetch repo tree. Is the repo public and token valid?")]
    TreeUnavailable,
}

/// A source-repository host.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Retrieve the full recursive file/directory listing of the default
    /// branch.
    async fn fetch_tree(&self, repo: &RepoRef) -> Result<Vec<TreeEntry>, FetchError>;

    /// Retrieve and decode one file's content. Any fetch or decode problem
    /// yields `None` for that path rather than an error.
    async fn fetch_file(&self, repo: &RepoRef, path: &str) -> Option<String>;
}
