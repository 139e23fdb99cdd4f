use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::{ForwardCache, Layer};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::model_file;
use crate::optim::sgd::Sgd;

/// An ordered stack of dense layers trained with per-sample SGD.
///
/// Layer 0 receives the raw input. All layers share one learning rate and the
/// network is trained against a single loss function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
    optimizer: Sgd,
    loss: LossType,
}

impl Network {
    /// Builds a network from the layer widths `[input, hidden.., output]` and
    /// one activation per transition, with freshly initialized parameters.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[ActivationFunction],
        learning_rate: f64,
        loss: LossType,
        rng: &mut R,
    ) -> Result<Network> {
        if layer_sizes.len() < 2 {
            return Err(NnError::InvalidConfig(
                "need at least an input and an output size".into(),
            ));
        }
        if layer_sizes.contains(&0) {
            return Err(NnError::InvalidConfig("layer sizes must be non-zero".into()));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(NnError::InvalidConfig(format!(
                "{} layers but {} activations",
                layer_sizes.len() - 1,
                activations.len()
            )));
        }

        let optimizer = Sgd::validated(learning_rate)?;
        let mut layers = Vec::with_capacity(activations.len());
        for (sizes, &activation) in layer_sizes.windows(2).zip(activations) {
            layers.push(Layer::new(sizes[0], sizes[1], activation, &mut *rng));
        }

        Ok(Network { layers, optimizer, loss })
    }

    /// Assembles a network from existing layers, checking that adjacent
    /// layers agree on their shared width.
    pub fn from_layers(layers: Vec<Layer>, learning_rate: f64, loss: LossType) -> Result<Network> {
        let network = Network { layers, optimizer: Sgd::validated(learning_rate)?, loss };
        network.validate()?;
        Ok(network)
    }

    fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig("network has no layers".into()));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(NnError::InvalidConfig(format!(
                    "layer {i} outputs {} values but layer {} expects {}",
                    pair[0].output_size(),
                    i + 1,
                    pair[1].input_size()
                )));
            }
        }
        Sgd::validated(self.optimizer.learning_rate)?;
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate
    }

    pub fn loss_type(&self) -> LossType {
        self.loss
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// Runs `input` through every layer in order.
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        let mut current = self.layers[0].forward(input)?.activation;
        for layer in &self.layers[1..] {
            current = layer.forward(&current)?.activation;
        }
        Ok(current)
    }

    /// Same as [`Network::forward`].
    pub fn predict(&self, input: &Matrix) -> Result<Matrix> {
        self.forward(input)
    }

    /// Forward pass keeping every layer's intermediate values for backprop.
    fn forward_cached(&self, input: &Matrix) -> Result<Vec<ForwardCache>> {
        let mut caches: Vec<ForwardCache> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let cache = match caches.last() {
                Some(prev) => layer.forward(&prev.activation)?,
                None => layer.forward(input)?,
            };
            caches.push(cache);
        }
        Ok(caches)
    }

    /// One SGD step on a single sample. Returns the sample's loss as measured
    /// before the update.
    pub fn train(&mut self, input: &Matrix, expected: &Matrix) -> Result<f64> {
        let caches = self.forward_cached(input)?;
        let predicted = match caches.last() {
            Some(cache) => &cache.activation,
            None => return Err(NnError::InvalidConfig("network has no layers".into())),
        };

        let loss = self.loss.loss(predicted, expected)?;
        let mut error = self.loss.derivative(predicted, expected)?;

        for (layer, cache) in self.layers.iter_mut().zip(&caches).rev() {
            error = layer.backprop(cache, &error, &self.optimizer)?;
        }

        Ok(loss)
    }

    fn train_pairs<'a, I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a Matrix, &'a Matrix)>,
    {
        for (input, expected) in pairs {
            self.train(input, expected)?;
        }
        Ok(())
    }

    /// Calls [`Network::train`] once per sample, in order. Gradients are not
    /// accumulated across samples.
    pub fn train_batch(&mut self, inputs: &[Matrix], expected_outputs: &[Matrix]) -> Result<()> {
        ensure_paired(inputs, expected_outputs)?;
        self.train_pairs(inputs.iter().zip(expected_outputs))
    }

    /// One epoch of per-sample SGD over a shuffled copy of the dataset.
    ///
    /// The returned mean loss is measured on the shuffled samples *before*
    /// any of this epoch's updates are applied.
    pub fn train_epoch<R: Rng + ?Sized>(
        &mut self,
        inputs: &[Matrix],
        expected_outputs: &[Matrix],
        rng: &mut R,
    ) -> Result<f64> {
        ensure_paired(inputs, expected_outputs)?;
        if inputs.is_empty() {
            return Err(NnError::EmptyDataset);
        }

        let order = shuffled_order(inputs.len(), rng);
        let pairs: Vec<(&Matrix, &Matrix)> = order
            .iter()
            .map(|&i| (&inputs[i], &expected_outputs[i]))
            .collect();

        let mut total_loss = 0.0;
        for &(input, expected) in &pairs {
            total_loss += self.loss.loss(&self.forward(input)?, expected)?;
        }
        let mean_loss = total_loss / pairs.len() as f64;

        self.train_pairs(pairs)?;

        log::debug!("epoch over {} samples, mean loss before updates {mean_loss:.6}", inputs.len());
        Ok(mean_loss)
    }

    /// Mean loss over a dataset without touching the parameters.
    pub fn evaluate_loss(&self, inputs: &[Matrix], expected_outputs: &[Matrix]) -> Result<f64> {
        ensure_paired(inputs, expected_outputs)?;
        if inputs.is_empty() {
            return Err(NnError::EmptyDataset);
        }

        let mut total = 0.0;
        for (input, expected) in inputs.iter().zip(expected_outputs) {
            total += self.loss.loss(&self.forward(input)?, expected)?;
        }
        Ok(total / inputs.len() as f64)
    }

    /// Fraction of samples whose output argmax equals the label argmax.
    pub fn evaluate_accuracy(&self, inputs: &[Matrix], expected_outputs: &[Matrix]) -> Result<f64> {
        ensure_paired(inputs, expected_outputs)?;
        if inputs.is_empty() {
            return Err(NnError::EmptyDataset);
        }

        let mut correct = 0usize;
        for (input, expected) in inputs.iter().zip(expected_outputs) {
            let output = self.forward(input)?;
            output.ensure_same_shape(expected, "accuracy label")?;
            if output.argmax() == expected.argmax() {
                correct += 1;
            }
        }
        Ok(correct as f64 / inputs.len() as f64)
    }

    /// Writes the learning rate and every layer's weights and biases in the
    /// line-oriented text format. Activations are not stored.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        model_file::write_model(self, &mut writer)?;
        writer.flush()?;
        log::info!("saved {} layers to {}", self.layers.len(), path.as_ref().display());
        Ok(())
    }

    /// Reads a model written by [`Network::save`]. `activations` must list the
    /// activation of each layer in the order used at training time.
    pub fn restore<P: AsRef<Path>>(
        path: P,
        activations: &[ActivationFunction],
        loss: LossType,
    ) -> Result<Network> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let (optimizer, layers) = model_file::read_model(&text, activations)?;
        let network = Network { layers, optimizer, loss };
        network.validate()?;
        log::info!("loaded {} layers from {}", network.layers.len(), path.as_ref().display());
        Ok(network)
    }

    /// Replaces this network's learning rate and layers with those stored at
    /// `path`, keeping the loss type. On failure `self` is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, activations: &[ActivationFunction]) -> Result<()> {
        *self = Network::restore(path, activations, self.loss)?;
        Ok(())
    }

    /// Serializes the whole network, activations and loss included, to a
    /// pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.validate()?;
        Ok(network)
    }
}

fn ensure_paired(inputs: &[Matrix], labels: &[Matrix]) -> Result<()> {
    if inputs.len() != labels.len() {
        return Err(NnError::SizeMismatch { inputs: inputs.len(), labels: labels.len() });
    }
    Ok(())
}

/// Uniformly random permutation of `0..n`.
fn shuffled_order<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}
