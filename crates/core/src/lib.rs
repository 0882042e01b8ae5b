//! `repodoc-core` — domain foundation for README generation.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): identifiers, the job entity and its state machine, repository
//! reference parsing, key-file selection, and context assembly.

pub mod context;
pub mod error;
pub mod id;
pub mod job;
pub mod keyfiles;
pub mod repo;

pub use context::assemble_context;
pub use error::{DomainError, DomainResult};
pub use id::{JobId, UserId};
pub use job::{Job, JobStatus};
pub use keyfiles::{select_key_files, TreeEntry, TreeEntryKind, MAX_KEY_FILES};
pub use repo::RepoRef;
