//! API route definitions

use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{error::ServerError, handlers, state::AppState};

async fn handle_404(uri: Uri) -> ServerError {
    ServerError::NotFound(format!("No route for {}", uri.path()))
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed. Use GET / or POST /predict.",
        })),
    )
}

/// Create the main application router. `GET` routes also answer `HEAD`.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configured via CORS_ORIGIN env var (default: allow all)
    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => CorsLayer::new().allow_origin(value),
            Err(_) => CorsLayer::new().allow_origin(Any),
        },
        _ => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
