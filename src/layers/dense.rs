use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// Initial weights and biases are drawn from `[-INIT_BOUND, INIT_BOUND)`.
/// Kept small so sigmoid outputs do not saturate on the first pass.
pub const INIT_BOUND: f64 = 0.1;

/// Intermediate values of one forward pass, consumed by [`Layer::backprop`].
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub input: Matrix,
    /// Pre-activation values (z = Wx + b).
    pub weighted_sum: Matrix,
    pub activation: Matrix,
}

/// Parameter gradients for one layer and one sample.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub weights: Matrix,
    pub biases: Matrix,
}

/// Fully connected layer: `weights` is (output_size × input_size), `biases`
/// is (output_size × 1). Inputs and outputs are column vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    weights: Matrix,
    biases: Matrix,
    activator: ActivationFunction,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let mut weights = Matrix::zeros(output_size, input_size);
        let mut biases = Matrix::zeros(output_size, 1);
        weights.randomize(-INIT_BOUND, INIT_BOUND, rng);
        biases.randomize(-INIT_BOUND, INIT_BOUND, rng);

        Layer { weights, biases, activator: activation }
    }

    /// Builds a layer from existing parameters, e.g. when restoring a model.
    pub fn with_params(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Result<Layer> {
        let layer = Layer { weights, biases, activator: activation };
        layer.validate()?;
        Ok(layer)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.biases.shape() != (self.weights.rows(), 1) {
            return Err(NnError::DimensionMismatch {
                op: "layer biases",
                left: self.weights.shape(),
                right: self.biases.shape(),
            });
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    /// Computes `activation(W·input + b)` for a column vector `input` of
    /// length `input_size`, returning everything backprop needs.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardCache> {
        if input.shape() != (self.input_size(), 1) {
            return Err(NnError::DimensionMismatch {
                op: "layer forward",
                left: self.weights.shape(),
                right: input.shape(),
            });
        }

        let weighted_sum = self.weights.dot(input)?.add(&self.biases)?;
        let activation = self.activator.activate(&weighted_sum);

        Ok(ForwardCache { input: input.clone(), weighted_sum, activation })
    }

    /// Local gradient δ = error ⊙ f'(z) and the parameter gradients it implies.
    /// `error` is ∂L/∂a for this layer's output.
    pub fn compute_gradients(&self, cache: &ForwardCache, error: &Matrix) -> Result<Gradients> {
        if cache.input.shape() != (self.input_size(), 1) {
            return Err(NnError::DimensionMismatch {
                op: "backprop cache",
                left: self.weights.shape(),
                right: cache.input.shape(),
            });
        }
        cache.weighted_sum.ensure_same_shape(&self.biases, "backprop cache")?;
        error.ensure_same_shape(&cache.activation, "backprop error")?;

        let act_derivative = self.activator.derivative_matrix(&cache.weighted_sum);
        let local_gradient = error.hadamard(&act_derivative)?;
        let weights = local_gradient.dot(&cache.input.transpose())?;

        Ok(Gradients { weights, biases: local_gradient })
    }

    /// Error handed to the previous layer: Wᵀ·δ.
    fn propagate_error(&self, local_gradient: &Matrix) -> Result<Matrix> {
        self.weights.transpose().dot(local_gradient)
    }

    /// One backward step for this layer: updates weights and biases in place
    /// and returns ∂L/∂input (input_size × 1) for the preceding layer.
    ///
    /// The returned error is always computed from the weights that produced
    /// `cache`, i.e. before this call's update is applied.
    pub fn backprop(&mut self, cache: &ForwardCache, error: &Matrix, optimizer: &Sgd) -> Result<Matrix> {
        let gradients = self.compute_gradients(cache, error)?;
        let error_to_previous = self.propagate_error(&gradients.biases)?;
        optimizer.step(self, gradients)?;
        Ok(error_to_previous)
    }

    /// Applies `param -= lr · grad` to weights and biases.
    pub fn apply_gradients(&mut self, gradients: Gradients, lr: f64) -> Result<()> {
        self.weights = self.weights.sub(&gradients.weights.scale(lr))?;
        self.biases = self.biases.sub(&gradients.biases.scale(lr))?;
        Ok(())
    }
}
