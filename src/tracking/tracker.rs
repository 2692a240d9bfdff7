//! Experiment tracker: named experiments, runs, params, metrics, artifacts

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::storage::{LocalStorage, StorageBackend};
use crate::error::{PredictorError, Result};

/// A single metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    /// Step/epoch number
    pub step: u64,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64, step: u64) -> Self {
        Self {
            name: name.into(),
            value,
            step,
            timestamp: Utc::now(),
        }
    }
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// A run within an experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    pub start_time: DateTime<Utc>,
    /// End time (None if still running)
    pub end_time: Option<DateTime<Utc>>,
    pub params: BTreeMap<String, String>,
    /// Latest value per metric
    pub metrics: BTreeMap<String, f64>,
    pub metrics_history: Vec<Metric>,
    /// Stored artifact paths
    pub artifacts: Vec<PathBuf>,
    pub status: RunStatus,
}

impl Run {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().simple().to_string(),
            run_name: run_name.into(),
            start_time: Utc::now(),
            end_time: None,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            metrics_history: Vec::new(),
            artifacts: Vec::new(),
            status: RunStatus::Running,
        }
    }

    /// Get run duration in seconds
    pub fn duration_secs(&self) -> f64 {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// An experiment containing multiple runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub runs: Vec<Run>,
}

impl Experiment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            experiment_id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            runs: Vec::new(),
        }
    }
}

/// Experiment tracker backed by a storage backend.
///
/// One run is active at a time. Logging calls without an active run fail with
/// `TrackingError`. Finished runs are appended to their experiment and
/// persisted immediately.
pub struct ExperimentTracker {
    storage: Box<dyn StorageBackend + Send + Sync>,
    experiments: RwLock<Vec<Experiment>>,
    current_experiment: RwLock<Option<String>>,
    current_run: RwLock<Option<Run>>,
}

impl ExperimentTracker {
    /// Open a tracker over a local directory, loading any recorded experiments
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(Box::new(LocalStorage::new(dir)))
    }

    pub fn new(storage: Box<dyn StorageBackend + Send + Sync>) -> Result<Self> {
        let experiments = storage.load_experiments()?;
        Ok(Self {
            storage,
            experiments: RwLock::new(experiments),
            current_experiment: RwLock::new(None),
            current_run: RwLock::new(None),
        })
    }

    /// Make `name` the active experiment, creating it if needed. Returns its id.
    pub fn set_experiment(&self, name: &str) -> String {
        let mut experiments = self.experiments.write();
        let experiment_id = match experiments.iter().find(|e| e.name == name) {
            Some(existing) => existing.experiment_id.clone(),
            None => {
                let experiment = Experiment::new(name);
                let id = experiment.experiment_id.clone();
                info!(experiment = name, id = %id, "Created experiment");
                experiments.push(experiment);
                id
            }
        };

        *self.current_experiment.write() = Some(experiment_id.clone());
        experiment_id
    }

    /// Start a new run under the active experiment
    pub fn start_run(&self, run_name: impl Into<String>) -> Result<String> {
        if self.current_experiment.read().is_none() {
            return Err(PredictorError::TrackingError("no active experiment".to_string()));
        }

        let mut current = self.current_run.write();
        if let Some(active) = current.as_ref() {
            return Err(PredictorError::TrackingError(format!(
                "run {} is still active",
                active.run_id
            )));
        }

        let run = Run::new(run_name);
        let run_id = run.run_id.clone();
        debug!(run_id = %run_id, "Run started");
        *current = Some(run);
        Ok(run_id)
    }

    pub fn log_param(&self, key: impl Into<String>, value: impl ToString) -> Result<()> {
        self.with_run(|run| {
            run.params.insert(key.into(), value.to_string());
        })
    }

    /// Record a metric value; the latest value per name is kept alongside the history
    pub fn log_metric(&self, name: impl Into<String>, value: f64, step: Option<u64>) -> Result<()> {
        let name = name.into();
        self.with_run(|run| {
            run.metrics.insert(name.clone(), value);
            run.metrics_history.push(Metric::new(name, value, step.unwrap_or(0)));
        })
    }

    /// Copy a file into the active run's artifact area
    pub fn log_artifact(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let experiment_id = self
            .current_experiment
            .read()
            .clone()
            .ok_or_else(|| PredictorError::TrackingError("no active experiment".to_string()))?;

        let mut current = self.current_run.write();
        let run = current
            .as_mut()
            .ok_or_else(|| PredictorError::TrackingError("no active run".to_string()))?;

        let stored = self
            .storage
            .store_artifact(&experiment_id, &run.run_id, path.as_ref())?;
        run.artifacts.push(stored.clone());
        Ok(stored)
    }

    /// Close the active run with `status`, attach it to its experiment and persist
    pub fn end_run(&self, status: RunStatus) -> Result<Run> {
        let mut run = self
            .current_run
            .write()
            .take()
            .ok_or_else(|| PredictorError::TrackingError("no active run".to_string()))?;
        run.end_time = Some(Utc::now());
        run.status = status;

        let experiment_id = self.current_experiment.read().clone();
        {
            let mut experiments = self.experiments.write();
            let experiment = experiments
                .iter_mut()
                .find(|e| Some(&e.experiment_id) == experiment_id.as_ref())
                .ok_or_else(|| PredictorError::TrackingError("active experiment vanished".to_string()))?;
            experiment.runs.push(run.clone());
        }

        self.save()?;
        info!(
            run_id = %run.run_id,
            status = ?status,
            duration_secs = run.duration_secs(),
            "Run ended"
        );
        Ok(run)
    }

    /// Get the current run
    pub fn current_run(&self) -> Option<Run> {
        self.current_run.read().clone()
    }

    pub fn get_experiment_by_name(&self, name: &str) -> Option<Experiment> {
        self.experiments.read().iter().find(|e| e.name == name).cloned()
    }

    pub fn list_experiments(&self) -> Vec<Experiment> {
        self.experiments.read().clone()
    }

    /// Save current state to storage
    pub fn save(&self) -> Result<()> {
        let experiments = self.experiments.read();
        self.storage.save_experiments(&experiments)
    }

    /// Reload state from storage, replacing what is in memory
    pub fn load(&self) -> Result<()> {
        let experiments = self.storage.load_experiments()?;
        *self.experiments.write() = experiments;
        Ok(())
    }


    fn with_run(&self, f: impl FnOnce(&mut Run)) -> Result<()> {
        let mut current = self.current_run.write();
        let run = current
            .as_mut()
            .ok_or_else(|| PredictorError::TrackingError("no active run".to_string()))?;
        f(run);
        Ok(())
    }
}
