use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;

/// Selects the (loss, loss-derivative) pair a network trains with.
///
/// - `Mse`          — mean-squared error; pair with Identity or Sigmoid output.
/// - `CrossEntropy` — categorical cross-entropy; pair with Softmax output.
///   Its derivative is the combined Softmax+CE gradient (predicted - expected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
}

impl LossType {
    pub fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        match self {
            LossType::Mse => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    /// Gradient of the loss w.r.t. the network output.
    pub fn derivative(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        match self {
            LossType::Mse => MseLoss::derivative(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
        }
    }
}
