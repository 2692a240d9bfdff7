//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use super::error::{Result, ServerError};
use super::schema::{predict_survey, PredictionResponse, SurveyInput};
use super::state::AppState;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Mental Health Prediction API is running" }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let metadata = state.pipeline.metadata();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": metadata.model,
        "trained_at": metadata.trained_at.to_rfc3339(),
        "n_features": state.pipeline.transform().n_features(),
        "loaded_at": state.loaded_at.to_rfc3339(),
    }))
}

/// Score one survey record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SurveyInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(input) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected prediction payload");
        ServerError::BadRequest(rejection.body_text())
    })?;

    let response = predict_survey(&state.pipeline, &input)?;
    debug!(
        prediction = response.prediction,
        probability_yes = response.probability_yes,
        "Prediction served"
    );
    Ok(Json(response))
}
