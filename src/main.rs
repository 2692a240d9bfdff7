//! Treatment predictor entry point: `train`, `serve` and `predict`.

use clap::Parser;
use treatment_predictor::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use treatment_predictor::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treatment_predictor=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_path,
            out_dir,
            experiment,
            do_split,
            test_size,
            max_iter,
            random_state,
            tracking_dir,
        } => {
            let mut config = TrainingConfig::new()
                .with_data_path(data_path)
                .with_out_dir(out_dir)
                .with_experiment(experiment)
                .with_max_iter(max_iter)
                .with_random_state(random_state)
                .with_tracking_dir(tracking_dir);
            if do_split {
                config = config.with_split(test_size);
            }
            // Blocking batch job; keep it off the async workers
            tokio::task::spawn_blocking(move || cmd_train(config)).await??;
        }
        Commands::Serve { host, port, model_path } => {
            cmd_serve(host, port, model_path).await?;
        }
        Commands::Predict { model, input } => {
            cmd_predict(&model, &input)?;
        }
    }

    Ok(())
}
