//! Training engine: load, preprocess, split, fit, evaluate, persist, track

use super::config::TrainingConfig;
use super::linear_models::LogisticRegression;
use super::models::ModelMetrics;
use super::pipeline::TrainedPipeline;
use super::split::{row_mask, stratified_train_test_split, take_labels};
use crate::error::Result;
use crate::preprocessing::{preprocess_raw, PreparedData};
use crate::tracking::{ExperimentTracker, RunStatus};
use crate::utils::DataLoader;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// File name of the persisted pipeline inside the output directory
pub const MODEL_FILE: &str = "model.bin";
/// File name of the feature-name list inside the output directory
pub const FEATURE_NAMES_FILE: &str = "feature_names.txt";

/// Summary of a finished training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub experiment_id: String,
    pub run_id: String,
    pub model_path: PathBuf,
    pub feature_names_path: PathBuf,
    pub n_features: usize,
    pub n_train: usize,
    /// Held-out rows; `None` when trained on the full dataset
    pub n_test: Option<usize>,
    /// Held-out metrics; `None` when trained on the full dataset
    pub metrics: Option<ModelMetrics>,
    pub training_time_secs: f64,
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

struct Split {
    x_train: DataFrame,
    y_train: Array1<f64>,
    held_out: Option<(DataFrame, Array1<f64>)>,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the configured CSV and run the full training job
    pub fn run(&self) -> Result<TrainingReport> {
        self.config.validate()?;
        let df = DataLoader::new().load_csv(&self.config.data_path)?;
        self.run_on_frame(&df)
    }

    /// Train from an already loaded raw survey table.
    ///
    /// Preprocessing errors (a missing `treatment` column) abort before a run
    /// is opened. Any later failure closes the run as failed. Artifacts are
    /// staged under `out_dir` and only moved into place once the run is
    /// recorded as finished, so a failed run leaves no artifact behind.
    pub fn run_on_frame(&self, df: &DataFrame) -> Result<TrainingReport> {
        self.config.validate()?;
        let prepared = preprocess_raw(df)?;

        let tracker = ExperimentTracker::with_dir(&self.config.tracking_dir)?;
        let experiment_id = tracker.set_experiment(&self.config.experiment);
        let run_id = tracker.start_run("train")?;
        let staging = self.config.out_dir.join(format!(".staging-{run_id}"));

        let outcome = self
            .fit_and_persist(&tracker, prepared, &staging)
            .and_then(|report| {
                tracker.end_run(RunStatus::Finished)?;
                Ok(report)
            });

        match outcome {
            Ok(mut report) => {
                self.promote(&staging)?;
                report.experiment_id = experiment_id;
                report.run_id = run_id;
                Ok(report)
            }
            Err(e) => {
                if tracker.current_run().is_some() {
                    if let Err(track_err) = tracker.end_run(RunStatus::Failed) {
                        warn!(error = %track_err, "Could not record failed run");
                    }
                }
                discard_staging(&staging);
                Err(e)
            }
        }
    }

    /// Move staged artifacts into `out_dir`, replacing those of earlier runs
    fn promote(&self, staging: &Path) -> Result<()> {
        for name in [MODEL_FILE, FEATURE_NAMES_FILE] {
            fs::rename(staging.join(name), self.config.out_dir.join(name))?;
        }
        fs::remove_dir(staging)?;
        info!(out_dir = %self.config.out_dir.display(), "Artifacts written");
        Ok(())
    }

    fn fit_and_persist(
        &self,
        tracker: &ExperimentTracker,
        prepared: PreparedData,
        staging: &Path,
    ) -> Result<TrainingReport> {
        let start = Instant::now();
        let config = &self.config;

        tracker.log_param("data_path", config.data_path.display())?;
        tracker.log_param("do_split", config.do_split)?;
        tracker.log_param("test_size", config.test_size)?;
        tracker.log_param("max_iter", config.max_iter)?;
        tracker.log_param("random_state", config.random_state)?;
        tracker.log_param("n_rows", prepared.features.height())?;

        let PreparedData {
            features,
            target,
            transform,
        } = prepared;
        let split = self.split(&features, &target)?;

        let classifier = LogisticRegression::new().with_max_iter(config.max_iter);
        let pipeline = TrainedPipeline::fit(transform, classifier, &split.x_train, &split.y_train)?;
        info!(
            rows = split.x_train.height(),
            features = pipeline.transform().n_features(),
            n_iter = pipeline.classifier().n_iter,
            "Pipeline fitted"
        );

        let mut n_test = None;
        let metrics = match &split.held_out {
            Some((x_test, y_test)) => {
                let y_pred = pipeline.predict(x_test)?;
                let y_prob = pipeline.predict_proba(x_test)?;
                let metrics = ModelMetrics::compute_classification(y_test, &y_pred, Some(&y_prob));

                for (name, value) in metrics.named() {
                    tracker.log_metric(name, value, None)?;
                }
                info!(
                    accuracy = metrics.accuracy,
                    precision = metrics.precision,
                    recall = metrics.recall,
                    f1 = metrics.f1_score,
                    roc_auc = metrics.auc_roc,
                    "Test metrics"
                );
                n_test = Some(x_test.height());
                Some(metrics)
            }
            None => None,
        };

        fs::create_dir_all(staging)?;

        let staged_model = staging.join(MODEL_FILE);
        pipeline.save(&staged_model)?;
        tracker.log_artifact(&staged_model)?;

        let staged_names = staging.join(FEATURE_NAMES_FILE);
        pipeline.save_feature_names(&staged_names)?;
        tracker.log_artifact(&staged_names)?;

        let model_path = config.out_dir.join(MODEL_FILE);
        let feature_names_path = config.out_dir.join(FEATURE_NAMES_FILE);
        info!(
            model = %model_path.display(),
            feature_names = %feature_names_path.display(),
            "Artifacts staged"
        );

        Ok(TrainingReport {
            experiment_id: String::new(),
            run_id: String::new(),
            model_path,
            feature_names_path,
            n_features: pipeline.transform().n_features(),
            n_train: split.x_train.height(),
            n_test,
            metrics,
            training_time_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn split(&self, features: &DataFrame, target: &Array1<f64>) -> Result<Split> {
        if !self.config.do_split {
            return Ok(Split {
                x_train: features.clone(),
                y_train: target.clone(),
                held_out: None,
            });
        }

        let n = features.height();
        let indices = stratified_train_test_split(target, self.config.test_size, self.config.random_state)?;
        info!(train = indices.train.len(), test = indices.test.len(), "Stratified split");

        Ok(Split {
            x_train: features.filter(&row_mask(&indices.train, n))?,
            y_train: take_labels(target, &indices.train),
            held_out: Some((
                features.filter(&row_mask(&indices.test, n))?,
                take_labels(target, &indices.test),
            )),
        })
    }
}

fn discard_staging(staging: &Path) {
    if staging.exists() {
        if let Err(e) = fs::remove_dir_all(staging) {
            warn!(path = %staging.display(), error = %e, "Could not remove staged artifacts");
        }
    }
}
