use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::layers::dense::{Gradients, Layer};

/// Plain stochastic gradient descent with one learning rate shared by all layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Learning rates must be finite and non-negative.
    pub fn validated(learning_rate: f64) -> Result<Sgd> {
        if !learning_rate.is_finite() || learning_rate < 0.0 {
            return Err(NnError::InvalidConfig(format!("invalid learning rate {learning_rate}")));
        }
        Ok(Sgd::new(learning_rate))
    }

    /// Applies one SGD weight update to a layer given its pre-computed gradients.
    pub fn step(&self, layer: &mut Layer, gradients: Gradients) -> Result<()> {
        layer.apply_gradients(gradients, self.learning_rate)
    }
}
