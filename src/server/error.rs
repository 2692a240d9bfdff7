//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::PredictorError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictorError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::Prediction(PredictorError::FeatureNotFound(column)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Input is missing column '{}'", column),
            ),
            ServerError::Prediction(e) => {
                tracing::error!(detail = %e, "Prediction error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction failed. Check server logs for details.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
