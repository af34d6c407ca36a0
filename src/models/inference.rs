//! Inference over a loaded model

use crate::error::{PredictError, Result};
use crate::types::{Dataset, Prediction};
use tracing::debug;

/// A loaded model: turns a table into one prediction per row.
///
/// Implementations do not need to check that the table's columns match what
/// the model was trained on; a mismatch surfaces as an inference error.
pub trait Predictor {
    /// Name used in log lines, usually the artifact file stem
    fn name(&self) -> &str;

    /// Produce predictions positionally aligned with `data.rows()`
    fn predict(&self, data: &Dataset) -> Result<Vec<Prediction>>;
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&self, data: &Dataset) -> Result<Vec<Prediction>> {
        (**self).predict(data)
    }
}

/// Run a model over the dataset and check one output per row
pub fn make_predictions(model: &dyn Predictor, data: &Dataset) -> Result<Vec<Prediction>> {
    let predictions = model.predict(data)?;

    if predictions.len() != data.len() {
        return Err(PredictError::Inference(format!(
            "model {} returned {} predictions for {} rows",
            model.name(),
            predictions.len(),
            data.len()
        )));
    }

    debug!(
        model = %model.name(),
        rows = data.len(),
        "Inference complete"
    );

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedOutput(Vec<Prediction>);

    impl Predictor for FixedOutput {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _data: &Dataset) -> Result<Vec<Prediction>> {
            Ok(self.0.clone())
        }
    }

    fn two_rows() -> Dataset {
        Dataset::from_records(
            [json!({"year": 2020}), json!({"year": 2021})]
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap()),
        )
    }

    #[test]
    fn test_predictions_aligned_with_rows() {
        let model = FixedOutput(vec![Prediction::Integer(1), Prediction::Integer(2)]);
        let predictions = make_predictions(&model, &two_rows()).unwrap();
        assert_eq!(predictions, vec![Prediction::Integer(1), Prediction::Integer(2)]);
    }

    #[test]
    fn test_row_count_mismatch_is_an_error() {
        let model: Box<dyn Predictor> = Box::new(FixedOutput(vec![Prediction::Integer(1)]));
        let err = make_predictions(&model, &two_rows()).unwrap_err();
        assert!(err.to_string().contains("1 predictions for 2 rows"));
    }
}
