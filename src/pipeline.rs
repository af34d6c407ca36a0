//! End-to-end prediction run: locate, load, read, predict, write

use crate::config::AppConfig;
use crate::data_loader::DataLoader;
use crate::error::Result;
use crate::metrics::{RunMetrics, Stage};
use crate::models::{make_predictions, ModelLoader, ModelLocator};
use crate::writer::PredictionWriter;
use std::path::PathBuf;
use tracing::info;

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Model artifact that was used
    pub model_path: PathBuf,
    /// Rows read and predicted
    pub records: usize,
    pub output_path: PathBuf,
}

/// Execute one prediction run against the configured directories.
///
/// Any failure aborts the run; nothing is retried and no partial output is
/// written after an error.
pub fn run(config: &AppConfig) -> Result<RunSummary> {
    let (summary, metrics) = run_with_metrics(config)?;
    metrics.print_summary();
    Ok(summary)
}

/// Same as [`run`], also returning stage timings
pub fn run_with_metrics(config: &AppConfig) -> Result<(RunSummary, RunMetrics)> {
    let mut metrics = RunMetrics::new();

    let locator = ModelLocator::new(&config.models.pattern)?;
    let model_path = metrics.time(Stage::Locate, || locator.locate(&config.paths.models_dir))?;

    let loader = ModelLoader::from_config(&config.models);
    let model = metrics.time(Stage::Load, || loader.load(&model_path))?;

    let data_loader = DataLoader::new(config.data.order);
    let data = metrics.time(Stage::Read, || data_loader.load(&config.paths.test_data_dir))?;
    metrics.record_rows(data.len());
    info!(
        records = data.len(),
        columns = data.columns().len(),
        "Test data loaded"
    );

    let predictions = metrics.time(Stage::Predict, || make_predictions(model.as_ref(), &data))?;

    let writer = PredictionWriter::new(config.output_path());
    metrics.time(Stage::Write, || writer.write(&predictions))?;

    Ok((
        RunSummary {
            model_path,
            records: data.len(),
            output_path: writer.output_path().to_path_buf(),
        },
        metrics,
    ))
}
