//! Repository reference parsing.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An `owner/repo` pair extracted from a submitted repository URL.
///
/// Only the first two path segments matter; anything after them (branches,
/// query strings, fragments) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl core::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = DomainError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let rest = url
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| DomainError::validation("invalid repository URL"))?;

        // Drop query string and fragment before looking at path segments.
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let _host = segments
            .next()
            .ok_or_else(|| DomainError::validation("invalid repository URL"))?;
        let owner = segments.next();
        let repo = segments.next();

        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok(Self::new(owner, repo)),
            _ => Err(DomainError::validation(
                "repository URL must contain an owner and a repository name",
            )),
        }
    }
}
