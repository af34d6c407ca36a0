//! Cars Prediction Library
//!
//! Loads the most recently saved pricing model, runs it over a directory of
//! single-record JSON files and writes the predictions as CSV.

pub mod config;
pub mod data_loader;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod types;
pub mod writer;

pub use config::AppConfig;
pub use data_loader::DataLoader;
pub use error::{PredictError, Result};
pub use models::{ModelLoader, ModelLocator, Predictor};
pub use pipeline::{run, RunSummary};
pub use types::{Dataset, Prediction, Record};
pub use writer::PredictionWriter;
