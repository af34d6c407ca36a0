//! Model discovery, loading and inference

pub mod inference;
pub mod loader;
pub mod locator;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod pipeline;

pub use inference::{make_predictions, Predictor};
pub use loader::ModelLoader;
pub use locator::{select_latest, ModelCandidate, ModelLocator};
pub use pipeline::{ModelArtifact, PipelineModel};
