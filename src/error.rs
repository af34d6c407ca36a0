//! Error types for the prediction run

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, loading or running a model
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No model files matching {pattern} found in {}", dir.display())]
    NoModelFiles { dir: PathBuf, pattern: String },

    #[error("Failed to deserialize model {}: {reason}", path.display())]
    Deserialization { path: PathBuf, reason: String },

    #[error("Failed to parse test record {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No test records (*.json) found in {}", dir.display())]
    NoTestRecords { dir: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid model file pattern: {0}")]
    InvalidPattern(String),
}

impl PredictError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PredictError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn deserialization(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PredictError::Deserialization {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
