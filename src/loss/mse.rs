use crate::error::Result;
use crate::math::matrix::Matrix;

/// Mean-squared error, averaged over every element (rows × cols).
pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: sum((predicted - expected)²) / (rows · cols)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let diff = predicted.sub(expected)?;
        let n = (predicted.rows() * predicted.cols()) as f64;
        Ok(diff.hadamard(&diff)?.sum() / n)
    }

    /// Gradient w.r.t. the prediction: (2 / (rows · cols)) · (predicted - expected).
    /// The normalization matches the denominator of [`MseLoss::loss`].
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let n = (predicted.rows() * predicted.cols()) as f64;
        Ok(predicted.sub(expected)?.scale(2.0 / n))
    }
}
