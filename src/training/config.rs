//! Training run configuration

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Raw survey CSV
    pub data_path: PathBuf,

    /// Directory receiving `model.bin` and `feature_names.txt`
    pub out_dir: PathBuf,

    /// Experiment the run is recorded under
    pub experiment: String,

    /// Hold out a stratified test split and evaluate on it
    pub do_split: bool,

    /// Fraction of rows held out when `do_split` is set
    pub test_size: f64,

    /// Iteration cap for the classifier
    pub max_iter: usize,

    /// Seed for the split shuffle
    pub random_state: u64,

    /// Root directory of the local experiment store
    pub tracking_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/survey.csv"),
            out_dir: PathBuf::from("models"),
            experiment: "mental-health-train".to_string(),
            do_split: false,
            test_size: 0.2,
            max_iter: 1000,
            random_state: 42,
            tracking_dir: PathBuf::from("mlruns"),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_experiment(mut self, name: impl Into<String>) -> Self {
        self.experiment = name.into();
        self
    }

    /// Enable the held-out split with the given test fraction
    pub fn with_split(mut self, test_size: f64) -> Self {
        self.do_split = true;
        self.test_size = test_size;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_tracking_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tracking_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PredictorError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(PredictorError::InvalidParameter {
                name: "max_iter".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.experiment.trim().is_empty() {
            return Err(PredictorError::ConfigError("experiment name is empty".to_string()));
        }
        Ok(())
    }
}
