//! Postgres-backed stores (behind the `postgres` feature).
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE jobs (
//!     id UUID PRIMARY KEY,
//!     user_id UUID NOT NULL,
//!     repo_url TEXT NOT NULL,
//!     status TEXT NOT NULL,
//!     generated_readme TEXT NOT NULL DEFAULT '',
//!     error TEXT,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY,
//!     email TEXT NOT NULL,
//!     generations_remaining INT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use repodoc_auth::{UserRecord, UserStore, UserStoreError};
use repodoc_core::{Job, JobId, JobStatus, UserId};

use crate::store::{JobStore, JobStoreError};

fn status_to_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}

fn status_from_str(raw: &str) -> Result<JobStatus, JobStoreError> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "processing" => Ok(JobStatus::Processing),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(JobStoreError::Storage(format!(
            "unknown job status in storage: {other}"
        ))),
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, JobStoreError> {
    let storage = |e: sqlx::Error| JobStoreError::Storage(e.to_string());

    let id: Uuid = row.try_get("id").map_err(storage)?;
    let user_id: Uuid = row.try_get("user_id").map_err(storage)?;
    let repo_url: String = row.try_get("repo_url").map_err(storage)?;
    let status: String = row.try_get("status").map_err(storage)?;
    let generated_readme: String = row.try_get("generated_readme").map_err(storage)?;
    let error: Option<String> = row.try_get("error").map_err(storage)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(storage)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(storage)?;

    Ok(Job {
        id: JobId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        repo_url,
        status: status_from_str(&status)?,
        generated_readme,
        error,
        created_at,
        updated_at,
    })
}

/// Durable [`JobStore`] on Postgres.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert(&self, job: Job) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            "INSERT INTO jobs \
             (id, user_id, repo_url, status, generated_readme, error, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(job.id.as_uuid())
        .bind(job.user_id.as_uuid())
        .bind(&job.repo_url)
        .bind(status_to_str(job.status))
        .bind(&job.generated_readme)
        .bind(&job.error)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::AlreadyExists(job.id));
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn update(&self, job: &Job) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = $2, generated_readme = $3, error = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(job.id.as_uuid())
        .bind(status_to_str(job.status))
        .bind(&job.generated_readme)
        .bind(&job.error)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::NotFound(job.id));
        }
        Ok(())
    }
}

/// Durable [`UserStore`] on Postgres.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: UserId) -> Result<Option<UserRecord>, UserStoreError> {
        let row = sqlx::query("SELECT id, email, generations_remaining FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserStoreError::Storage(e.to_string()))?;

        row.map(|row| {
            let storage = |e: sqlx::Error| UserStoreError::Storage(e.to_string());
            let id: Uuid = row.try_get("id").map_err(storage)?;
            let email: String = row.try_get("email").map_err(storage)?;
            let remaining: i32 = row.try_get("generations_remaining").map_err(storage)?;
            Ok(UserRecord::new(
                UserId::from_uuid(id),
                email,
                remaining.max(0) as u32,
            ))
        })
        .transpose()
    }

    async fn upsert(&self, user: UserRecord) -> Result<(), UserStoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, generations_remaining) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE \
             SET email = EXCLUDED.email, \
                 generations_remaining = EXCLUDED.generations_remaining",
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(user.generations_remaining as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn consume_generation(&self, id: UserId) -> Result<bool, UserStoreError> {
        // Conditional decrement: the WHERE clause makes this atomic under
        // concurrent completions and floors the counter at zero.
        let result = sqlx::query(
            "UPDATE users SET generations_remaining = generations_remaining - 1 \
             WHERE id = $1 AND generations_remaining > 0",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::Storage(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
