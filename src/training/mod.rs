//! Model training
//!
//! - Logistic regression classifier
//! - Stratified train/test split
//! - Evaluation metrics (accuracy, precision, recall, F1, ROC-AUC)
//! - The persisted transform + classifier pipeline
//! - The end-to-end training job

mod config;
mod engine;
mod models;
mod pipeline;
pub mod linear_models;
pub mod split;

pub use config::TrainingConfig;
pub use engine::{TrainEngine, TrainingReport, FEATURE_NAMES_FILE, MODEL_FILE};
pub use linear_models::LogisticRegression;
pub use models::{roc_auc, ModelMetrics};
pub use pipeline::{PipelineMetadata, TrainedPipeline, MODEL_IDENTIFIER};
pub use split::{stratified_train_test_split, SplitIndices};
