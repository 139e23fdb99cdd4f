use crate::error::Result;
use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Predictions are clamped to [EPS, 1 - EPS] before the log so log(0) never happens.
const EPS: f64 = 1e-15;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * log(clamp(predicted[i], eps, 1 - eps)))
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        predicted.ensure_same_shape(expected, "cross_entropy")?;
        Ok(predicted.as_slice().iter().zip(expected.as_slice())
            .map(|(p, e)| -e * p.clamp(EPS, 1.0 - EPS).ln())
            .sum())
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the pre-softmax
    /// logits: `predicted - expected`.
    ///
    /// Only meaningful when `predicted` came out of a Softmax layer; that
    /// pairing is not checked here.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        predicted.sub(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_probability_is_clamped() {
        let p = Matrix::column(&[0.0, 1.0]).unwrap();
        let y = Matrix::column(&[1.0, 0.0]).unwrap();
        let loss = CrossEntropyLoss::loss(&p, &y).unwrap();
        assert!(loss.is_finite());
        assert!((loss - (-(1e-15f64).ln())).abs() < 1e-9);
    }

    #[test]
    fn confident_correct_prediction_is_near_zero() {
        let p = Matrix::column(&[0.999, 0.001]).unwrap();
        let y = Matrix::column(&[1.0, 0.0]).unwrap();
        assert!(CrossEntropyLoss::loss(&p, &y).unwrap() < 0.01);
        let grad = CrossEntropyLoss::derivative(&p, &y).unwrap();
        assert!((grad[(0, 0)] + 0.001).abs() < 1e-12);
        assert!((grad[(1, 0)] - 0.001).abs() < 1e-12);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let p = Matrix::column(&[0.5, 0.5]).unwrap();
        let y = Matrix::column(&[1.0]).unwrap();
        assert!(CrossEntropyLoss::loss(&p, &y).is_err());
    }
}
