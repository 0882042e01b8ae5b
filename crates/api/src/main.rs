use std::sync::Arc;

use repodoc_api::app::{self, AppServices, services::ServiceConfig};

#[tokio::main]
async fn main() {
    repodoc_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let config = ServiceConfig {
        github_token: std::env::var("GITHUB_TOKEN").ok(),
        gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
            tracing::warn!("GEMINI_API_KEY not set; generation calls will fail");
            String::new()
        }),
    };

    let services = Arc::new(AppServices::build(config));
    let app = app::build_app(services, jwt_secret);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
