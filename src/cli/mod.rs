//! Command-line interface for training, serving and one-off prediction.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::server::{predict_survey, run_server, ServerConfig, SurveyInput};
use crate::training::{TrainEngine, TrainedPipeline, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn row(key: &str, val: impl std::fmt::Display) {
    println!("  {:<18} {}", muted(key), val.to_string().white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "treatment-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve a mental-health treatment classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the pipeline on a survey CSV and write its artifacts
    Train {
        /// Survey CSV file
        #[arg(long, default_value = "data/survey.csv")]
        data_path: PathBuf,

        /// Output directory for model.bin and feature_names.txt
        #[arg(long, default_value = "models")]
        out_dir: PathBuf,

        /// Experiment name for run tracking
        #[arg(long, default_value = "mental-health-train")]
        experiment: String,

        /// Hold out a stratified test set and report metrics
        #[arg(long)]
        do_split: bool,

        /// Held-out fraction when --do-split is set
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Solver iteration cap
        #[arg(long, default_value = "1000")]
        max_iter: usize,

        /// Seed for the split shuffle
        #[arg(long, default_value = "42")]
        random_state: u64,

        /// Directory holding experiment records and run artifacts
        #[arg(long, default_value = "mlruns")]
        tracking_dir: PathBuf,
    },

    /// Start the prediction API
    Serve {
        /// Bind address (overrides API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Persisted pipeline (overrides MODEL_PATH)
        #[arg(long)]
        model_path: Option<PathBuf>,
    },

    /// Score one survey record from a JSON file
    Predict {
        /// Persisted pipeline
        #[arg(short, long, default_value = "models/model.bin")]
        model: PathBuf,

        /// JSON file holding one survey record
        #[arg(short, long)]
        input: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: TrainingConfig) -> anyhow::Result<()> {
    section("Train");
    row("Data", config.data_path.display());
    row("Output", config.out_dir.display());
    row("Experiment", &config.experiment);
    row(
        "Split",
        if config.do_split {
            format!("stratified, test_size={}", config.test_size)
        } else {
            "none (full dataset)".to_string()
        },
    );
    println!();

    step_run("Training logistic regression");
    let start = Instant::now();
    let report = TrainEngine::new(config).run()?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    row("Run", &report.run_id);
    row("Features", report.n_features);
    row("Train rows", report.n_train);
    if let Some(n_test) = report.n_test {
        row("Test rows", n_test);
    }
    if let Some(metrics) = &report.metrics {
        println!();
        for (name, value) in metrics.named() {
            println!("  {:<18} {}", muted(name), format!("{:.4}", value).white().bold());
        }
    }
    println!();
    println!("  {} Model saved to {}", ok("✓"), report.model_path.display());
    println!("  {} Feature names saved to {}", ok("✓"), report.feature_names_path.display());
    println!();

    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        model_path: model_path.unwrap_or(defaults.model_path),
    };

    section("Serve");
    row("Model", config.model_path.display());
    row("API", format!("http://{}:{}", config.host, config.port));
    row("Predict", format!("POST http://{}:{}/predict", config.host, config.port));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

/// Prints the response JSON only, so the output can be piped
pub fn cmd_predict(model_path: &Path, input_path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input_path.display(), e))?;
    let input: SurveyInput = serde_json::from_str(&raw)?;
    let pipeline = TrainedPipeline::load(model_path)?;
    let response = predict_survey(&pipeline, &input)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
