//! Predictions file writer

use crate::error::{PredictError, Result};
use crate::types::Prediction;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Header of the single output column
pub const PREDICTIONS_HEADER: &str = "predictions";

/// Writes predictions as a one-column CSV file with a header and no index
pub struct PredictionWriter {
    output_path: PathBuf,
}

impl PredictionWriter {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write all predictions, creating the parent directory if needed
    pub fn write(&self, predictions: &[Prediction]) -> Result<()> {
        let path = self.output_path.as_path();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| PredictError::io(dir, e))?;
        }

        let file = File::create(path).map_err(|e| PredictError::io(path, e))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "{}", PREDICTIONS_HEADER).map_err(|e| PredictError::io(path, e))?;
        for prediction in predictions {
            writeln!(out, "{}", prediction.to_csv_field()).map_err(|e| PredictError::io(path, e))?;
        }
        out.flush().map_err(|e| PredictError::io(path, e))?;

        info!("Predictions saved to {}", path.display());
        Ok(())
    }
}
