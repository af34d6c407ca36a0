//! Test record loading: one JSON object per file, stacked into a dataset

use crate::config::RecordOrder;
use crate::error::{PredictError, Result};
use crate::types::{Dataset, Record};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a directory of single-record JSON files
pub struct DataLoader {
    order: RecordOrder,
}

impl DataLoader {
    pub fn new(order: RecordOrder) -> Self {
        Self { order }
    }

    /// List `*.json` files (non-recursive) in the configured order
    pub fn record_files<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| PredictError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PredictError::io(dir, e))?;
            let path = entry.path();
            let is_json = entry.file_name().to_string_lossy().ends_with(".json");
            if is_json && path.is_file() {
                files.push(path);
            }
        }

        if self.order == RecordOrder::Sorted {
            files.sort();
        }

        Ok(files)
    }

    /// Load every record file into one dataset.
    ///
    /// One malformed file fails the whole load; there is no partial result.
    pub fn load<P: AsRef<Path>>(&self, dir: P) -> Result<Dataset> {
        let dir = dir.as_ref();
        let files = self.record_files(dir)?;

        if files.is_empty() {
            return Err(PredictError::NoTestRecords {
                dir: dir.to_path_buf(),
            });
        }

        let mut dataset = Dataset::new();
        for file in &files {
            dataset.push_record(read_record(file)?);
        }

        debug!(
            dir = %dir.display(),
            records = dataset.len(),
            columns = dataset.columns().len(),
            order = ?self.order,
            "Loaded test records"
        );

        Ok(dataset)
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(RecordOrder::default())
    }
}

/// Parse one file holding a single JSON object
pub fn read_record(path: &Path) -> Result<Record> {
    let content = fs::read(path).map_err(|e| PredictError::io(path, e))?;
    let value: Value = serde_json::from_slice(&content).map_err(|source| PredictError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(record) => Ok(record),
        other => Err(PredictError::Parse {
            path: path.to_path_buf(),
            source: serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                kind(&other)
            )),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
