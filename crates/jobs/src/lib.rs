//! `repodoc-jobs` — job persistence and the background lifecycle runner.
//!
//! ## Design
//!
//! - Jobs are accepted synchronously and driven to a terminal state by a
//!   detached tokio task (accept-then-continue).
//! - Every state transition is persisted; failure detail lands on the job
//!   row, never on the creating request.
//! - Quota is consumed exactly once per completed job, never on failure.
//!
//! ## Components
//!
//! - `JobStore`: persistence seam (in-memory by default, Postgres behind the
//!   `postgres` feature)
//! - `JobRunner`: drives one job through the fetch → select → assemble →
//!   generate pipeline

pub mod runner;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use runner::{JobError, JobRunner};
pub use store::{InMemoryJobStore, JobStore, JobStoreError};
