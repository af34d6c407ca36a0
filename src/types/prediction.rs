//! Scalar model outputs

use serde::{Deserialize, Serialize};
use std::fmt;

/// One model output for one dataset row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    /// Integer output, e.g. a class index or a rounded price
    Integer(i64),
    /// Continuous score
    Float(f64),
    /// Class label
    Label(String),
}

impl Prediction {
    /// Render as a single CSV field
    pub fn to_csv_field(&self) -> String {
        match self {
            Prediction::Label(label) => {
                if label.contains([',', '"', '\n', '\r']) {
                    format!("\"{}\"", label.replace('"', "\"\""))
                } else {
                    label.clone()
                }
            }
            // Missing values are written as empty fields
            Prediction::Float(value) if value.is_nan() => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Integer(value) => write!(f, "{}", value),
            // Shortest round-trip form, exponent for very large or small magnitudes
            Prediction::Float(value) if value.is_finite() => write!(f, "{:?}", value),
            Prediction::Float(value) => write!(f, "{}", value),
            Prediction::Label(label) => write!(f, "{}", label),
        }
    }
}

impl From<i64> for Prediction {
    fn from(value: i64) -> Self {
        Prediction::Integer(value)
    }
}

impl From<f64> for Prediction {
    fn from(value: f64) -> Self {
        Prediction::Float(value)
    }
}

impl From<&str> for Prediction {
    fn from(value: &str) -> Self {
        Prediction::Label(value.to_string())
    }
}
