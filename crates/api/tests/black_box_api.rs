use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use repodoc_ai::{GenerationError, ReadmeGenerator};
use repodoc_api::app::{self, AppServices};
use repodoc_auth::{InMemoryUserStore, JwtClaims, UserRecord, UserStore};
use repodoc_core::{RepoRef, TreeEntry, UserId};
use repodoc_github::{FetchError, RepoHost};
use repodoc_jobs::InMemoryJobStore;

// ─────────────────────────────────────────────────────────────────────────────
// Fakes for the external collaborators
// ─────────────────────────────────────────────────────────────────────────────

struct FakeRepoHost {
    tree: Result<Vec<TreeEntry>, FetchError>,
    files: HashMap<String, String>,
}

impl FakeRepoHost {
    fn healthy() -> Self {
        Self {
            tree: Ok(vec![
                TreeEntry::blob("package.json"),
                TreeEntry::blob("src/app.js"),
                TreeEntry::tree("docs/"),
            ]),
            files: [
                ("package.json".to_string(), "{\"name\":\"demo\"}".to_string()),
                ("src/app.js".to_string(), "console.log(1);".to_string()),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn unavailable() -> Self {
        Self {
            tree: Err(FetchError::TreeUnavailable),
            files: HashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl RepoHost for FakeRepoHost {
    async fn fetch_tree(&self, _repo: &RepoRef) -> Result<Vec<TreeEntry>, FetchError> {
        self.tree.clone()
    }

    async fn fetch_file(&self, _repo: &RepoRef, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }
}

struct FakeGenerator;

#[async_trait::async_trait]
impl ReadmeGenerator for FakeGenerator {
    async fn generate(&self, _context: &str) -> Result<String, GenerationError> {
        Ok("# Demo\n\nGenerated.".to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    users: Arc<InMemoryUserStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(host: FakeRepoHost) -> Self {
        // Build the same router as prod, but with fake collaborators and an
        // ephemeral port.
        let jobs = Arc::new(InMemoryJobStore::new());
        let users = Arc::new(InMemoryUserStore::new());
        let services = Arc::new(AppServices::new(
            jobs,
            users.clone(),
            Arc::new(host),
            Arc::new(FakeGenerator),
        ));
        let app = app::build_app(services, JWT_SECRET.to_string());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            users,
            handle,
        }
    }

    async fn seed_user(&self, quota: u32) -> UserId {
        let id = UserId::new();
        self.users
            .upsert(UserRecord::new(id, "dev@example.com", quota))
            .await
            .unwrap();
        id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user_id: UserId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_job(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    repo_url: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/generate", base_url))
        .bearer_auth(token)
        .json(&json!({ "repoUrl": repo_url }))
        .send()
        .await
        .unwrap()
}

/// Poll the status endpoint until the job reaches a terminal state.
async fn poll_until_terminal(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    job_id: &str,
) -> serde_json::Value {
    for _ in 0..100 {
        let res = client
            .get(format!("{}/api/generate/status/{}", base_url, job_id))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = res.json().await.unwrap();
        match body["status"].as_str() {
            Some("completed") | Some("failed") => return body,
            Some("pending") | Some("processing") => {}
            other => panic!("unexpected status: {:?}", other),
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    panic!("job did not reach a terminal state within timeout");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth("garbage-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthorized() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();

    // Valid signature, but the store has never seen this user.
    let token = mint_jwt(UserId::new());
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_open() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_repo_url_is_rejected_synchronously() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(srv.seed_user(5).await);

    let res = create_job(&client, &srv.base_url, &token, "https://host/onlyone").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhausted_quota_is_rejected_synchronously() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(srv.seed_user(0).await);

    let res = create_job(&client, &srv.base_url, &token, "https://github.com/o/r").await;
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "quota_exhausted");
}

#[tokio::test]
async fn full_generation_flow_completes_and_decrements_quota() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();
    let user_id = srv.seed_user(2).await;
    let token = mint_jwt(user_id);

    let res = create_job(&client, &srv.base_url, &token, "https://github.com/o/r").await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = res.json().await.unwrap();
    let job_id = body["jobId"].as_str().unwrap().to_string();
    assert_eq!(body["message"], "Generation job accepted.");

    let job = poll_until_terminal(&client, &srv.base_url, &token, &job_id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["generatedReadme"], "# Demo\n\nGenerated.");
    assert!(job.get("error").is_none());
    assert_eq!(job["userId"], user_id.to_string());

    // Quota consumed exactly once.
    let who: serde_json::Value = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(who["generationsRemaining"], 1);
}

#[tokio::test]
async fn failed_job_keeps_quota_and_records_error() {
    let srv = TestServer::spawn(FakeRepoHost::unavailable()).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(srv.seed_user(3).await);

    let res = create_job(&client, &srv.base_url, &token, "https://github.com/o/r").await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = res.json().await.unwrap();
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let job = poll_until_terminal(&client, &srv.base_url, &token, &job_id).await;
    assert_eq!(job["status"], "failed");
    assert_eq!(
        job["error"],
        "Could not fetch repo tree. Is the repo public and token valid?"
    );
    assert_eq!(job["generatedReadme"], "");

    let who: serde_json::Value = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(who["generationsRemaining"], 3);
}

#[tokio::test]
async fn status_of_unknown_job_is_not_found() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(srv.seed_user(1).await);

    let res = client
        .get(format!(
            "{}/api/generate/status/{}",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/generate/status/not-a-uuid", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_of_someone_elses_job_is_forbidden() {
    let srv = TestServer::spawn(FakeRepoHost::healthy()).await;
    let client = reqwest::Client::new();
    let owner_token = mint_jwt(srv.seed_user(2).await);
    let intruder_token = mint_jwt(srv.seed_user(2).await);

    let res = create_job(
        &client,
        &srv.base_url,
        &owner_token,
        "https://github.com/o/r",
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = res.json().await.unwrap();
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/generate/status/{}", srv.base_url, job_id))
        .bearer_auth(&intruder_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
