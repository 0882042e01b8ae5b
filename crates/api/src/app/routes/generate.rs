//! README-generation endpoints: accept a job, poll its status.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use repodoc_core::{Job, JobId, RepoRef};

use crate::app::{AppServices, dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_generation))
        .route("/status/:id", get(get_generation_status))
}

/// POST /api/generate
///
/// Quota and URL validation happen synchronously; the response is sent before
/// any downstream work begins. The heavy pipeline continues in a detached
/// task.
pub async fn create_generation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateGenerationRequest>,
) -> axum::response::Response {
    let record = match services.users.get(user.user_id()).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unknown user");
        }
        Err(e) => {
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                e.to_string(),
            );
        }
    };

    if record.generations_remaining == 0 {
        return errors::json_error(
            StatusCode::PAYMENT_REQUIRED,
            "quota_exhausted",
            "No generations remaining. Please upgrade.",
        );
    }

    let repo: RepoRef = match body.repo_url.parse() {
        Ok(r) => r,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_repo_url", format!("{e}"));
        }
    };

    let job = Job::new(user.user_id(), body.repo_url);
    let job_id = job.id;
    if let Err(e) = services.jobs.insert(job.clone()).await {
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        );
    }

    info!(%job_id, user_id = %user.user_id(), repo = %repo, "generation job accepted");

    // Hand off without awaiting; the request returns immediately.
    services.runner.spawn(job, repo);

    (
        StatusCode::ACCEPTED,
        Json(dto::CreateGenerationResponse {
            message: "Generation job accepted.".to_string(),
            job_id: job_id.to_string(),
        }),
    )
        .into_response()
}

/// GET /api/generate/status/:id
pub async fn get_generation_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let job_id: JobId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id");
        }
    };

    let job = match services.jobs.get(job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Job not found"),
        Err(e) => {
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                e.to_string(),
            );
        }
    };

    if job.user_id != user.user_id() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Not authorized to view this job",
        );
    }

    (StatusCode::OK, Json(job)).into_response()
}
