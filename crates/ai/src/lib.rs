//! `repodoc-ai` — text-generation boundary.
//!
//! One call in, one README out. Provider-specific failure detail is logged
//! but never surfaced: callers see a single generic error, and a structurally
//! odd (but successful) response is masked with a fixed fallback string.

use async_trait::async_trait;
use thiserror::Error;

mod gemini;

pub use gemini::GeminiClient;

/// Returned when the provider answers 200 but carries no candidate text.
pub const FALLBACK_RESPONSE: &str = "No response generated.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport or HTTP-level failure talking to the provider.
    #[error("AI generation failed.")]
    RequestFailed,
}

/// Produces a README from an assembled context blob.
#[async_trait]
pub trait ReadmeGenerator: Send + Sync {
    async fn generate(&self, context: &str) -> Result<String, GenerationError>;
}
