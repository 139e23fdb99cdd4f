use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Beyond this magnitude `exp(-x)` is either irrelevant or overflows, so the
/// sigmoid saturates to exactly 0.0 or 1.0.
const SIGMOID_CLAMP: f64 = 500.0;

/// The activation applied by a layer after its linear transform.
///
/// Every derivative takes the *pre-activation* value (the weighted sum), the
/// same argument the forward function takes, so layer backprop is uniform
/// across variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Vector-valued; applied per column by [`ActivationFunction::activate`].
    /// Pair it with cross-entropy loss, whose derivative already yields the
    /// combined gradient `predicted - expected`.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
}

pub fn sigmoid(x: f64) -> f64 {
    if x > SIGMOID_CLAMP {
        1.0
    } else if x < -SIGMOID_CLAMP {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// σ(x)·(1 − σ(x)) for the pre-activation `x`.
pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

pub fn relu_derivative(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

/// Column-wise softmax, stabilized by subtracting each column's maximum
/// before exponentiating.
pub fn softmax(m: &Matrix) -> Matrix {
    let mut res = m.clone();
    for j in 0..m.cols() {
        let max = (0..m.rows()).map(|i| m[(i, j)]).fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for i in 0..m.rows() {
            let e = (m[(i, j)] - max).exp();
            res[(i, j)] = e;
            total += e;
        }
        for i in 0..m.rows() {
            res[(i, j)] /= total;
        }
    }
    res
}

impl ActivationFunction {
    /// Element-wise activation. `Softmax` has no element-wise form; calling
    /// this on it returns `x` unchanged, use [`ActivationFunction::activate`].
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => relu(x),
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Element-wise derivative evaluated at the pre-activation `x`.
    ///
    /// `Softmax` returns `1.0` so the softmax/cross-entropy gradient computed
    /// by the loss passes through the layer without the Jacobian being
    /// applied twice.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid_derivative(x),
            ActivationFunction::ReLU => relu_derivative(x),
            ActivationFunction::Identity | ActivationFunction::Softmax => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }

    /// Applies the activation to a whole weighted-sum matrix.
    pub fn activate(&self, weighted_sum: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Softmax => softmax(weighted_sum),
            _ => weighted_sum.map(|x| self.function(x)),
        }
    }

    /// Derivative matrix for the cached weighted sum of a forward pass.
    pub fn derivative_matrix(&self, weighted_sum: &Matrix) -> Matrix {
        weighted_sum.map(|x| self.derivative(x))
    }
}
