//! Configuration management for the prediction run

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the project base directory
pub const PROJECT_PATH_VAR: &str = "PROJECT_PATH";

/// Prefix for per-key environment overrides, e.g. `CARS_PREDICT__DATA__ORDER`
const ENV_PREFIX: &str = "CARS_PREDICT";

/// Encoding of the model artifact on disk
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Sniff the file content
    #[default]
    Auto,
    /// Serde pipeline artifact
    Json,
    /// ONNX graph (needs the `onnx` feature)
    Onnx,
}

/// Order in which test record files are stacked
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrder {
    /// Lexicographic file name order, stable across machines
    #[default]
    Sorted,
    /// Raw directory listing order
    Listing,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub models: ModelsConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for model artifacts
    pub models_dir: PathBuf,
    /// Directory of single-record JSON files
    pub test_data_dir: PathBuf,
    /// Directory the predictions file is written into
    pub output_dir: PathBuf,
    /// File name of the predictions file
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

/// Model selection and loading
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// File name pattern, `*` matches any run of characters
    #[serde(default = "default_model_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub format: ModelFormat,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Test data loading
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub order: RecordOrder,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_output_file() -> String {
    "predictions.csv".to_string()
}

fn default_model_pattern() -> String {
    "cars_pipe_*.pkl".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl AppConfig {
    /// Load configuration from `PROJECT_PATH` (default `.`) and environment overrides
    pub fn load() -> Result<Self> {
        let base = std::env::var_os(PROJECT_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::load_for_project(base)
    }

    /// Load configuration rooted at an explicit project directory
    pub fn load_for_project<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref();
        let path_str = |p: PathBuf| p.to_string_lossy().into_owned();

        let config = Config::builder()
            .set_default("paths.models_dir", path_str(base.join("data/models")))?
            .set_default("paths.test_data_dir", path_str(base.join("data/test")))?
            .set_default("paths.output_dir", path_str(base.join("data/predictions")))?
            .set_default("paths.output_file", default_output_file())?
            .set_default("models.pattern", default_model_pattern())?
            .set_default("models.format", "auto")?
            .set_default("models.onnx_threads", 1_i64)?
            .set_default("data.order", "sorted")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Defaults for a project directory, without reading the environment
    pub fn from_project_path<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            paths: PathsConfig {
                models_dir: base.join("data/models"),
                test_data_dir: base.join("data/test"),
                output_dir: base.join("data/predictions"),
                output_file: default_output_file(),
            },
            models: ModelsConfig {
                pattern: default_model_pattern(),
                format: ModelFormat::Auto,
                onnx_threads: default_onnx_threads(),
            },
            data: DataConfig {
                order: RecordOrder::Sorted,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    /// Full path of the predictions file
    pub fn output_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.paths.output_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_project_path(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.paths.models_dir, Path::new("./data/models"));
        assert_eq!(config.paths.test_data_dir, Path::new("./data/test"));
        assert_eq!(config.output_path(), Path::new("./data/predictions/predictions.csv"));
        assert_eq!(config.models.pattern, "cars_pipe_*.pkl");
        assert_eq!(config.models.format, ModelFormat::Auto);
        assert_eq!(config.data.order, RecordOrder::Sorted);
    }

    #[test]
    fn test_load_for_project_derives_paths() {
        let config = AppConfig::load_for_project("/srv/cars").unwrap();
        assert_eq!(config.paths.models_dir, Path::new("/srv/cars/data/models"));
        assert_eq!(
            config.output_path(),
            Path::new("/srv/cars/data/predictions/predictions.csv")
        );
        assert_eq!(config.models.onnx_threads, 1);
        assert_eq!(config.logging.level, "info");
    }
}
