//! `repodoc-auth` — authentication boundary and user/quota records.
//!
//! Token *issuance* (registration, login, password hashing) lives outside
//! this system; this crate only verifies bearer tokens and tracks the
//! per-user generation quota.

pub mod claims;
pub mod user;
pub mod validator;

pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use user::{InMemoryUserStore, UserRecord, UserStore, UserStoreError};
pub use validator::{AuthError, Hs256JwtValidator, JwtValidator};
