//! ONNX Runtime adapter for exported pipelines

use crate::error::{PredictError, Result};
use crate::models::inference::Predictor;
use crate::types::{Dataset, Prediction};
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use serde_json::Value;
use std::sync::RwLock;
use tracing::{debug, info};

/// ONNX graph fed with every dataset column as an `f32` feature
pub struct OnnxModel {
    name: String,
    /// ONNX Runtime session (run needs exclusive access)
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    /// Build a session from serialized graph bytes
    pub fn from_bytes(name: &str, bytes: &[u8], onnx_threads: usize) -> anyhow::Result<Self> {
        ort::init().commit()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_memory(bytes)
            .context("Failed to build ONNX session")?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .context("ONNX graph has no inputs")?;

        // Prefer a score-like output over a label output
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("variable") || o.name.contains("output"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .context("ONNX graph has no outputs")?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            threads = onnx_threads,
            "ONNX model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    /// Row-major `[rows, columns]` feature matrix
    fn feature_matrix(data: &Dataset) -> Result<Vec<f32>> {
        let mut features = Vec::with_capacity(data.len() * data.columns().len());
        for (i, row) in data.rows().iter().enumerate() {
            for column in data.columns() {
                let x = match row.get(column) {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => None,
                };
                let x = x.ok_or_else(|| {
                    PredictError::Inference(format!(
                        "row {}: column {} is not numeric, ONNX models take numeric features only",
                        i, column
                    ))
                })?;
                features.push(x as f32);
            }
        }
        Ok(features)
    }

    fn run(&self, data: &Dataset) -> anyhow::Result<Vec<Prediction>> {
        let rows = data.len();
        let shape = vec![rows as i64, data.columns().len() as i64];
        let features = Self::feature_matrix(data)?;
        let input_tensor =
            Tensor::from_array((shape, features)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        let output = outputs
            .get(&self.output_name)
            .with_context(|| format!("Output {} missing from results", self.output_name))?;

        if let Ok((shape, values)) = output.try_extract_tensor::<f32>() {
            let per_row = per_row_width(shape.iter().copied().collect(), rows)?;
            debug!(model = %self.name, per_row, "Extracted f32 scores");
            return Ok(values
                .chunks(per_row)
                .map(|chunk| Prediction::Float(chunk[per_row - 1] as f64))
                .collect());
        }

        if let Ok((shape, values)) = output.try_extract_tensor::<i64>() {
            let per_row = per_row_width(shape.iter().copied().collect(), rows)?;
            debug!(model = %self.name, per_row, "Extracted i64 labels");
            return Ok(values
                .chunks(per_row)
                .map(|chunk| Prediction::Integer(chunk[0]))
                .collect());
        }

        anyhow::bail!("Output {} is neither an f32 nor an i64 tensor", self.output_name)
    }
}

/// Values per row for an output of shape `[rows]` or `[rows, k]`
fn per_row_width(dims: Vec<i64>, rows: usize) -> anyhow::Result<usize> {
    match dims.as_slice() {
        [n] if *n as usize == rows => Ok(1),
        [n, k] if *n as usize == rows && *k >= 1 => Ok(*k as usize),
        other => anyhow::bail!("Unexpected output shape {:?} for {} rows", other, rows),
    }
}

impl Predictor for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, data: &Dataset) -> Result<Vec<Prediction>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        self.run(data).map_err(|e| match e.downcast::<PredictError>() {
            Ok(inner) => inner,
            Err(e) => PredictError::Inference(format!("{}: {:#}", self.name, e)),
        })
    }
}
