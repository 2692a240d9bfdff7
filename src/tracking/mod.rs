//! Experiment tracking
//!
//! Records training runs (params, metrics, artifacts) under named experiments
//! in a local directory.

mod storage;
mod tracker;

pub use storage::{LocalStorage, StorageBackend};
pub use tracker::{Experiment, ExperimentTracker, Metric, Run, RunStatus};
