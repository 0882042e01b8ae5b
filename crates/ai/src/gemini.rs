//! Gemini `generateContent` client.

use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{FALLBACK_RESPONSE, GenerationError, ReadmeGenerator};

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-pro:generateContent";

/// Gemini-backed [`ReadmeGenerator`].
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// The fixed instructional template; `{context}` is interpolated verbatim.
fn build_prompt(context: &str) -> String {
    format!(
        "You are an expert technical writer, \"RepoDoc.ai\".\n\
         Your job is to generate a professional README.md file based on a project's \
         file structure and key file contents.\n\n\
         Analyze the following context, which contains file paths and their content:\n\
         ---\n\
         CONTEXT:\n\
         {context}\n\
         ---\n\n\
         Based ONLY on the context provided, generate a complete README.md file.\n\
         Your response MUST be only the raw markdown content. Do not include \
         ```markdown or any other text.\n\n\
         The README must include:\n\
         1. **Project Title**\n\
         2. **Description**\n\
         3. **Tech Stack**\n\
         4. **Installation**\n\
         5. **Usage**\n"
    )
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// First candidate's first text part, if the response has the expected
    /// shape.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
    }
}

#[async_trait::async_trait]
impl ReadmeGenerator for GeminiClient {
    async fn generate(&self, context: &str) -> Result<String, GenerationError> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let body = json!({
            "contents": [
                { "parts": [ { "text": build_prompt(context) } ] }
            ]
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error = %e, "generation request failed");
                GenerationError::RequestFailed
            })?;

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = %e, "generation response was not valid JSON");
            GenerationError::RequestFailed
        })?;

        Ok(parsed
            .first_text()
            .unwrap_or_else(|| FALLBACK_RESPONSE.to_string()))
    }
}
