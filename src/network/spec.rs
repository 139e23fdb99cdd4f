use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::loss::loss_type::LossType;
use crate::network::network::Network;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `activation` — activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
}

/// A fully serializable description of a network architecture plus its
/// learning rate and training loss.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights. It is also the natural source of the per-layer
/// activation list that [`Network::load`] needs for text models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, shown when training starts.
    pub name: String,
    /// Width of the raw input column vector.
    pub input_size: usize,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    pub learning_rate: f64,
    /// Loss function to pair with this network during training.
    pub loss: LossType,
}

impl NetworkSpec {
    /// `[input_size, layer sizes..]`, the form [`Network::new`] takes.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size)
            .chain(self.layers.iter().map(|l| l.size))
            .collect()
    }

    pub fn activations(&self) -> Vec<ActivationFunction> {
        self.layers.iter().map(|l| l.activation).collect()
    }

    /// Builds a freshly initialized network matching this spec.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        Network::new(
            &self.layer_sizes(),
            &self.activations(),
            self.learning_rate,
            self.loss,
            rng,
        )
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
