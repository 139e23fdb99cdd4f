//! Line-oriented text model format:
//!
//! ```text
//! <learning rate>
//! <layer count N>
//! N × (<weights matrix> <biases matrix>)
//! ```
//!
//! Each matrix is written by [`Matrix::serialize_text`]. Activation functions are
//! not part of the file; the reader supplies them per layer.

use std::io::Write;

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::math::text::LineReader;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;

pub(crate) fn write_model<W: Write>(network: &Network, out: &mut W) -> Result<()> {
    writeln!(out, "{}", network.learning_rate())?;
    writeln!(out, "{}", network.layers().len())?;
    for layer in network.layers() {
        layer.weights().serialize_text(out)?;
        layer.biases().serialize_text(out)?;
    }
    Ok(())
}

/// Parses the whole model before returning anything, so a malformed file
/// never yields a partially built layer list.
pub(crate) fn read_model(text: &str, activations: &[ActivationFunction]) -> Result<(Sgd, Vec<Layer>)> {
    let mut reader = LineReader::new(text);

    let learning_rate: f64 = reader.parse_next("learning rate")?;
    let optimizer = Sgd::validated(learning_rate)
        .map_err(|e| NnError::parse(reader.line(), e.to_string()))?;

    let count: usize = reader.parse_next("layer count")?;
    if count == 0 {
        return Err(NnError::parse(reader.line(), "model has no layers"));
    }
    if activations.len() != count {
        return Err(NnError::InvalidConfig(format!(
            "model has {count} layers but {} activations were supplied",
            activations.len()
        )));
    }

    let mut layers: Vec<Layer> = Vec::with_capacity(count);
    for &activation in activations {
        let weights = Matrix::deserialize_text(&mut reader)?;
        let biases = Matrix::deserialize_text(&mut reader)?;
        let layer = Layer::with_params(weights, biases, activation)
            .map_err(|e| NnError::parse(reader.line(), e.to_string()))?;

        if let Some(prev) = layers.last() {
            if prev.output_size() != layer.input_size() {
                return Err(NnError::parse(
                    reader.line(),
                    format!(
                        "layer {} expects {} inputs but the previous layer outputs {}",
                        layers.len(),
                        layer.input_size(),
                        prev.output_size()
                    ),
                ));
            }
        }
        layers.push(layer);
    }

    reader.finish()?;
    Ok((optimizer, layers))
}
