//! Cars Prediction - Main Entry Point
//!
//! Picks the latest model under `$PROJECT_PATH/data/models`, predicts every
//! record in `$PROJECT_PATH/data/test` and writes
//! `$PROJECT_PATH/data/predictions/predictions.csv`.

use anyhow::{Context, Result};
use cars_predict::{config::AppConfig, pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("cars_predict={}", config.logging.level))
    })?;
    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting prediction run");
    info!(
        models_dir = %config.paths.models_dir.display(),
        test_data_dir = %config.paths.test_data_dir.display(),
        output_dir = %config.paths.output_dir.display(),
        "Configuration loaded successfully"
    );

    let summary = pipeline::run(&config).context("Prediction run failed")?;

    info!(
        model = %summary.model_path.display(),
        records = summary.records,
        output = %summary.output_path.display(),
        "Prediction run complete"
    );

    Ok(())
}
