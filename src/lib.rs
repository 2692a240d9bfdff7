//! Treatment predictor
//!
//! Trains a binary classifier that predicts whether a survey respondent is
//! likely to seek mental-health treatment, and serves it over HTTP.
//!
//! # Modules
//!
//! - [`preprocessing`] - Survey cleaning, imputation, scaling, one-hot encoding
//! - [`training`] - Logistic regression, stratified split, metrics, the training job
//! - [`tracking`] - Experiment and run tracking with local artifact storage
//! - [`server`] - Prediction API
//! - [`cli`] - Command-line interface
//! - [`utils`] - CSV loading

pub mod error;

pub mod preprocessing;
pub mod training;
pub mod tracking;

pub mod server;
pub mod cli;

pub mod utils;

pub use error::{PredictorError, Result};
