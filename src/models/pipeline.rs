//! Serde pipeline artifacts: preprocessing steps plus an estimator

use crate::error::{PredictError, Result};
use crate::models::inference::Predictor;
use crate::types::{Dataset, Prediction, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;

/// Descriptive fields written by the training job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    pub name: String,
    /// Column the model was trained to predict
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

/// Per-row transformation applied before the estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreprocessStep {
    /// Replace a null or absent value
    FillMissing { column: String, value: Value },
    /// Map x to (x - mean) / scale
    StandardScale { column: String, mean: f64, scale: f64 },
}

/// Output transform of a linear scorer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    #[default]
    Identity,
    Logistic,
}

/// Intercept, numeric weights and one-hot category weights.
///
/// Terms are summed in artifact order so a score is bit-identical across loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearTerms {
    #[serde(default)]
    pub intercept: f64,
    /// Weight per numeric column
    #[serde(default)]
    pub weights: IndexMap<String, f64>,
    /// Weight per (categorical column, category); unknown categories score zero
    #[serde(default)]
    pub categories: IndexMap<String, IndexMap<String, f64>>,
}

/// Final model of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    /// Same value for every row
    Constant { value: Prediction },
    /// Linear regression, optionally through a logistic link
    Linear {
        #[serde(flatten)]
        terms: LinearTerms,
        #[serde(default)]
        link: Link,
    },
    /// One linear scorer per class; highest score wins
    LinearClassifier {
        classes: Vec<Prediction>,
        models: Vec<LinearTerms>,
    },
}

/// A trained pipeline exported as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub metadata: ArtifactMetadata,
    #[serde(default)]
    pub preprocessing: Vec<PreprocessStep>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Parse an artifact and check its internal consistency
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, String> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        for step in &self.preprocessing {
            if let PreprocessStep::StandardScale { column, scale, .. } = step {
                if *scale == 0.0 || !scale.is_finite() {
                    return Err(format!("standard_scale on {} has invalid scale {}", column, scale));
                }
            }
        }

        if let Estimator::LinearClassifier { classes, models } = &self.estimator {
            if classes.is_empty() {
                return Err("linear_classifier has no classes".to_string());
            }
            if classes.len() != models.len() {
                return Err(format!(
                    "linear_classifier has {} classes but {} models",
                    classes.len(),
                    models.len()
                ));
            }
        }

        Ok(())
    }

    /// Apply preprocessing steps to one row
    fn preprocess(&self, row: &Record) -> std::result::Result<Record, String> {
        let mut row = row.clone();
        for step in &self.preprocessing {
            match step {
                PreprocessStep::FillMissing { column, value } => {
                    let missing = row.get(column).map(Value::is_null).unwrap_or(true);
                    if missing {
                        row.insert(column.clone(), value.clone());
                    }
                }
                PreprocessStep::StandardScale {
                    column,
                    mean,
                    scale,
                } => {
                    let x = numeric(&row, column)?;
                    let scaled = (x - mean) / scale;
                    let scaled = serde_json::Number::from_f64(scaled)
                        .ok_or_else(|| format!("column {} scaled to a non-finite value", column))?;
                    row.insert(column.clone(), Value::Number(scaled));
                }
            }
        }
        Ok(row)
    }

    fn predict_row(&self, row: &Record) -> std::result::Result<Prediction, String> {
        match &self.estimator {
            Estimator::Constant { value } => Ok(value.clone()),
            Estimator::Linear { terms, link } => {
                let z = terms.score(row)?;
                let y = match link {
                    Link::Identity => z,
                    Link::Logistic => 1.0 / (1.0 + (-z).exp()),
                };
                Ok(Prediction::Float(y))
            }
            Estimator::LinearClassifier { classes, models } => {
                let mut best: Option<(usize, f64)> = None;
                for (i, model) in models.iter().enumerate() {
                    let score = model.score(row)?;
                    if best.map(|(_, s)| score > s).unwrap_or(true) {
                        best = Some((i, score));
                    }
                }
                best.and_then(|(i, _)| classes.get(i).cloned())
                    .ok_or_else(|| "classifier produced no score".to_string())
            }
        }
    }
}

impl LinearTerms {
    fn score(&self, row: &Record) -> std::result::Result<f64, String> {
        let mut z = self.intercept;
        for (column, weight) in &self.weights {
            z += weight * numeric(row, column)?;
        }
        for (column, weights) in &self.categories {
            if let Some(category) = category_key(row.get(column)) {
                z += weights.get(&category).copied().unwrap_or(0.0);
            }
        }
        Ok(z)
    }
}

/// Read a column as a number; booleans count as 0/1
fn numeric(row: &Record, column: &str) -> std::result::Result<f64, String> {
    match row.get(column) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("column {} is out of range", column)),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(Value::Null) | None => Err(format!("column {} is missing", column)),
        Some(other) => Err(format!("column {} is not numeric: {}", column, other)),
    }
}

fn category_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Predictor backed by a [`ModelArtifact`]
pub struct PipelineModel {
    name: String,
    artifact: ModelArtifact,
}

impl PipelineModel {
    pub fn new(name: impl Into<String>, artifact: ModelArtifact) -> Self {
        Self {
            name: name.into(),
            artifact,
        }
    }
}

impl Predictor for PipelineModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, data: &Dataset) -> Result<Vec<Prediction>> {
        data.rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                self.artifact
                    .preprocess(row)
                    .and_then(|row| self.artifact.predict_row(&row))
                    .map_err(|e| PredictError::Inference(format!("row {}: {}", i, e)))
            })
            .collect()
    }
}
