use crate::error::{self, Result};
use crate::ops;
use crate::tensor::Tensor;

/// Agreement between predictions and reference labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

/// Compares `predictions` with the argmax of each `labels` row.
pub fn evaluate(predictions: &[usize], labels: &Tensor) -> Result<Evaluation> {
    let reference = ops::argmax(labels).map_err(|err| err.in_stage("evaluate"))?;
    if reference.len() != predictions.len() {
        return Err(error::shape("evaluate", format!(
            "{} predictions for {} labels", predictions.len(), reference.len())));
    }

    let correct = predictions.iter()
        .zip(&reference)
        .filter(|(predicted, expected)| predicted == expected)
        .count();
    let total = predictions.len();
    let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };

    Ok(Evaluation { correct, total, accuracy })
}
