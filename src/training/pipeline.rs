//! Fitted transform + classifier, persisted as a single artifact

use super::linear_models::LogisticRegression;
use crate::error::{PredictorError, Result};
use crate::preprocessing::FeatureTransformer;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Identifier reported alongside every prediction
pub const MODEL_IDENTIFIER: &str = "logistic-regression + preprocessing pipeline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub model: String,
    pub trained_at: DateTime<Utc>,
    pub n_train_samples: usize,
    pub crate_version: String,
}

/// The trained artifact. Immutable once fit; share it behind `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    transform: FeatureTransformer,
    classifier: LogisticRegression,
    metadata: PipelineMetadata,
}

impl TrainedPipeline {
    /// Fit `transform` on the training rows, then fit `classifier` on the
    /// transformed matrix.
    pub fn fit(
        mut transform: FeatureTransformer,
        mut classifier: LogisticRegression,
        x_train: &DataFrame,
        y_train: &Array1<f64>,
    ) -> Result<Self> {
        let x = transform.fit_transform(x_train)?;
        classifier.fit(&x, y_train)?;

        Ok(Self {
            transform,
            classifier,
            metadata: PipelineMetadata {
                model: MODEL_IDENTIFIER.to_string(),
                trained_at: Utc::now(),
                n_train_samples: x_train.height(),
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Probability of treatment for every row of `df`
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transform.transform(df)?;
        self.classifier.predict_proba(&x)
    }

    /// Predicted label (0.0 / 1.0) for every row of `df`
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transform.transform(df)?;
        self.classifier.predict(&x)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.transform.feature_names()
    }

    pub fn transform(&self) -> &FeatureTransformer {
        &self.transform
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn metadata(&self) -> &PipelineMetadata {
        &self.metadata
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Write the pipeline as one bincode blob, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        info!(path = %path.display(), features = self.transform.n_features(), "Pipeline saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PredictorError::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open model {}: {}", path.display(), e),
            ))
        })?;
        let pipeline: Self = bincode::deserialize_from(BufReader::new(file))?;

        if !pipeline.transform.is_fitted() || !pipeline.classifier.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        Ok(pipeline)
    }

    /// Write the feature-name list, one name per line
    pub fn save_feature_names(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.feature_names().join("\n"))?;
        Ok(())
    }
}
