//! User records and the per-user generation quota.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use repodoc_core::UserId;

/// A consumer of the generation service.
///
/// Registration/login is an external concern; this record only carries what
/// the gateway and the job pipeline need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub generations_remaining: u32,
}

impl UserRecord {
    pub fn new(id: UserId, email: impl Into<String>, generations_remaining: u32) -> Self {
        Self {
            id,
            email: email.into(),
            generations_remaining,
        }
    }
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// User lookup and quota accounting.
///
/// `consume_generation` must be atomic with respect to concurrent callers:
/// two jobs completing at once for the same user may each consume at most one
/// generation, and the counter never goes below zero.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, UserStoreError>;

    async fn upsert(&self, user: UserRecord) -> Result<(), UserStoreError>;

    /// Decrement the user's remaining-generation counter by one, but only if
    /// it is above zero. Returns whether a generation was consumed.
    async fn consume_generation(&self, id: UserId) -> Result<bool, UserStoreError>;
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn upsert(&self, user: UserRecord) -> Result<(), UserStoreError> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }

    async fn consume_generation(&self, id: UserId) -> Result<bool, UserStoreError> {
        // Single write lock makes the check-then-decrement atomic.
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) if user.generations_remaining > 0 => {
                user.generations_remaining -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
