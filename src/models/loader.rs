//! Model artifact loader

use crate::config::{ModelFormat, ModelsConfig};
use crate::error::{PredictError, Result};
use crate::models::inference::Predictor;
use crate::models::pipeline::{ModelArtifact, PipelineModel};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// First byte of every pickle protocol 2+ stream
const PICKLE_PROTO: u8 = 0x80;

/// Loader for model artifacts in any supported format
pub struct ModelLoader {
    format: ModelFormat,
    /// Number of threads for ONNX inference
    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader for a fixed artifact format
    pub fn new(format: ModelFormat) -> Self {
        Self {
            format,
            onnx_threads: 1,
        }
    }

    pub fn from_config(config: &ModelsConfig) -> Self {
        Self {
            format: config.format,
            onnx_threads: config.onnx_threads.max(1),
        }
    }

    /// Load a model artifact from file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn Predictor>> {
        let path = path.as_ref();
        info!("Loading model: {}", path.display());

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        let bytes = fs::read(path).map_err(|e| PredictError::io(path, e))?;

        let format = match self.format {
            ModelFormat::Auto => sniff_format(path, &bytes)?,
            format => format,
        };
        debug!(model = %name, format = ?format, bytes = bytes.len(), "Decoding model artifact");

        match format {
            ModelFormat::Json | ModelFormat::Auto => {
                let artifact = ModelArtifact::from_slice(&bytes)
                    .map_err(|reason| PredictError::deserialization(path, reason))?;
                info!(
                    model = %name,
                    steps = artifact.preprocessing.len(),
                    trained_at = ?artifact.metadata.trained_at,
                    "Model loaded successfully"
                );
                Ok(Box::new(PipelineModel::new(name, artifact)))
            }
            ModelFormat::Onnx => self.load_onnx(path, &name, &bytes),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path, name: &str, bytes: &[u8]) -> Result<Box<dyn Predictor>> {
        let model = crate::models::onnx::OnnxModel::from_bytes(name, bytes, self.onnx_threads)
            .map_err(|e| PredictError::deserialization(path, format!("{:#}", e)))?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path, _name: &str, _bytes: &[u8]) -> Result<Box<dyn Predictor>> {
        Err(PredictError::deserialization(
            path,
            "ONNX artifacts need a build with the `onnx` feature",
        ))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(ModelFormat::Auto)
    }
}

/// Guess the artifact format from its leading bytes
fn sniff_format(path: &Path, bytes: &[u8]) -> Result<ModelFormat> {
    let first = bytes
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace());

    match first {
        None => Err(PredictError::deserialization(path, "artifact is empty")),
        Some(b'{') => Ok(ModelFormat::Json),
        Some(PICKLE_PROTO) => Err(PredictError::deserialization(
            path,
            "Python pickle artifacts cannot be loaded; export the pipeline as JSON or ONNX",
        )),
        Some(_) if cfg!(feature = "onnx") => Ok(ModelFormat::Onnx),
        Some(_) => Err(PredictError::deserialization(
            path,
            "unrecognized artifact format",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dataset, Prediction};

    #[test]
    fn test_load_json_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars_pipe_v1.pkl");
        fs::write(
            &path,
            r#"{"metadata": {"name": "cars_pipe"}, "estimator": {"type": "constant", "value": "high"}}"#,
        )
        .unwrap();

        let model = ModelLoader::default().load(&path).unwrap();
        assert_eq!(model.name(), "cars_pipe_v1");

        let mut data = Dataset::new();
        data.push_record(serde_json::Map::new());
        assert_eq!(model.predict(&data).unwrap(), vec![Prediction::from("high")]);
    }

    #[test]
    fn test_pickle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars_pipe_v1.pkl");
        fs::write(&path, [0x80u8, 0x04, 0x95, 0x00]).unwrap();

        let err = ModelLoader::default().load(&path).err().unwrap();
        assert!(matches!(err, PredictError::Deserialization { .. }));
        assert!(err.to_string().contains("pickle"));
    }

    #[test]
    fn test_corrupt_json_is_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars_pipe_v1.pkl");
        fs::write(&path, "{\"estimator\": ").unwrap();

        let err = ModelLoader::new(ModelFormat::Json).load(&path).err().unwrap();
        assert!(matches!(err, PredictError::Deserialization { .. }));
    }

    #[test]
    fn test_empty_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars_pipe_v1.pkl");
        fs::write(&path, "  \n").unwrap();

        let err = ModelLoader::default().load(&path).err().unwrap();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::default()
            .load(dir.path().join("cars_pipe_v9.pkl"))
            .err().unwrap();
        assert!(matches!(err, PredictError::Io { .. }));
    }
}
