use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{AppServices, errors};
use crate::context::UserContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
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

    Json(serde_json::json!({
        "userId": record.id.to_string(),
        "email": record.email,
        "generationsRemaining": record.generations_remaining,
    }))
    .into_response()
}
