//! Application state shared across handlers

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::training::TrainedPipeline;

/// Read-only state built once at startup and shared through `Arc`
#[derive(Debug)]
pub struct AppState {
    pub pipeline: TrainedPipeline,
    pub model_path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: TrainedPipeline, model_path: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            model_path: model_path.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Load the pipeline artifact at `model_path`
    pub fn load(model_path: &Path) -> Result<Self> {
        let pipeline = TrainedPipeline::load(model_path)?;
        info!(
            path = %model_path.display(),
            model = %pipeline.metadata().model,
            trained_at = %pipeline.metadata().trained_at.to_rfc3339(),
            features = pipeline.transform().n_features(),
            "Model loaded"
        );
        Ok(Self::new(pipeline, model_path))
    }
}
