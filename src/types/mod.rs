//! Type definitions for the prediction run

pub mod dataset;
pub mod prediction;

pub use dataset::{Dataset, Record};
pub use prediction::Prediction;
