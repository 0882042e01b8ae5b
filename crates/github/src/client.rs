//! GitHub REST client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::warn;

use repodoc_core::{RepoRef, TreeEntry, TreeEntryKind};

use crate::{FetchError, RepoHost};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

/// GitHub-backed [`RepoHost`].
///
/// Unauthenticated use works for public repositories but runs into low rate
/// limits quickly; pass a token where possible.
pub struct GithubClient {
    http: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (tests, GHE).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .header(reqwest::header::USER_AGENT, "repodoc");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[async_trait::async_trait]
impl RepoHost for GithubClient {
    async fn fetch_tree(&self, repo: &RepoRef) -> Result<Vec<TreeEntry>, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/main?recursive=1",
            self.base_url, repo.owner, repo.repo
        );

        let response = self
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(repo = %repo, error = %e, "failed to fetch repo tree");
                FetchError::TreeUnavailable
            })?;

        let body: TreeResponse = response.json().await.map_err(|e| {
            warn!(repo = %repo, error = %e, "failed to decode tree response");
            FetchError::TreeUnavailable
        })?;

        Ok(body
            .tree
            .into_iter()
            .map(|item| {
                let kind = match item.kind.as_str() {
                    "blob" => TreeEntryKind::Blob,
                    _ => TreeEntryKind::Tree,
                };
                TreeEntry::new(item.path, kind)
            })
            .collect())
    }

    async fn fetch_file(&self, repo: &RepoRef, path: &str) -> Option<String> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.repo, path
        );

        let response = match self.get(url).send().await.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => {
                warn!(repo = %repo, path, error = %e, "failed to fetch file content");
                return None;
            }
        };

        let body: ContentResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(repo = %repo, path, error = %e, "failed to decode content response");
                return None;
            }
        };

        if body.encoding != "base64" {
            warn!(repo = %repo, path, encoding = %body.encoding, "unknown content encoding");
            return None;
        }

        decode_base64_content(&body.content).or_else(|| {
            warn!(repo = %repo, path, "content is not valid base64-encoded UTF-8");
            None
        })
    }
}

/// Decode the base64 blob GitHub returns for file contents.
///
/// The API wraps the payload with newlines, so whitespace is stripped first.
fn decode_base64_content(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_base64() {
        assert_eq!(
            decode_base64_content("aGVsbG8="),
            Some("hello".to_string())
        );
    }

    #[test]
    fn decodes_newline_wrapped_base64() {
        // GitHub chunks payloads at 60 chars with trailing newlines.
        assert_eq!(
            decode_base64_content("aGVs\nbG8g\nd29y\nbGQ=\n"),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(decode_base64_content("!!not base64!!"), None);
    }

    #[test]
    fn rejects_non_utf8_payload() {
        // 0xFF 0xFE is not valid UTF-8.
        let raw = BASE64.encode([0xFF, 0xFE]);
        assert_eq!(decode_base64_content(&raw), None);
    }
}
