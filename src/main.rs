//! Digit classifier training harness.
//!
//! Usage:
//!   ferrite-mlp <train.csv> <test.csv> [epochs] [spec.json]
//!
//! Set `RUST_LOG=info` to see per-epoch progress.

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ferrite_mlp::data::{load_labelled_csv, CsvFormat};
use ferrite_mlp::{ActivationFunction, LayerSpec, LossType, NetworkSpec, TrainConfig, train_loop};

const TRAIN_SAMPLES: usize = 3000;
const TEST_SAMPLES: usize = 500;
const DEFAULT_EPOCHS: usize = 10;
const EVAL_EVERY: usize = 2;
const MODEL_PATH: &str = "trained_model.txt";

/// 784 → 128 (ReLU) → 64 (ReLU) → 10 (Sigmoid), MSE, lr = 1e-4.
fn default_spec() -> NetworkSpec {
    NetworkSpec {
        name: "digits".into(),
        input_size: 784,
        layers: vec![
            LayerSpec { size: 128, activation: ActivationFunction::ReLU },
            LayerSpec { size: 64, activation: ActivationFunction::ReLU },
            LayerSpec { size: 10, activation: ActivationFunction::Sigmoid },
        ],
        learning_rate: 0.0001,
        loss: LossType::Mse,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        bail!("usage: ferrite-mlp <train.csv> <test.csv> [epochs] [spec.json]");
    }
    let epochs = match args.get(2) {
        Some(raw) => raw.parse::<usize>().with_context(|| format!("invalid epoch count {raw:?}"))?,
        None => DEFAULT_EPOCHS,
    };
    let spec = match args.get(3) {
        Some(path) => NetworkSpec::load_json(path).with_context(|| format!("reading spec {path}"))?,
        None => default_spec(),
    };

    let format = CsvFormat {
        n_classes: spec.layers.last().map_or(0, |l| l.size),
        n_features: spec.input_size,
        ..CsvFormat::mnist()
    };
    let train = load_labelled_csv(&args[0], format.with_max_samples(TRAIN_SAMPLES))
        .with_context(|| format!("loading {}", args[0]))?;
    let test = load_labelled_csv(&args[1], format.with_max_samples(TEST_SAMPLES))
        .with_context(|| format!("loading {}", args[1]))?;

    let mut rng = StdRng::from_entropy();
    let mut network = spec.build(&mut rng)?;

    println!(
        "Training {} on {} samples, testing on {} samples",
        spec.name,
        train.len(),
        test.len()
    );
    let config = TrainConfig::new(epochs, EVAL_EVERY);
    let history = train_loop(&mut network, &train, Some(&test), &config, &mut rng)?;
    for stats in &history {
        match stats.accuracy {
            Some(acc) => println!(
                "Epoch {}/{}: loss {:.6}, test accuracy {:.2}%",
                stats.epoch, stats.total_epochs, stats.train_loss, acc * 100.0
            ),
            None => println!("Epoch {}/{}: loss {:.6}", stats.epoch, stats.total_epochs, stats.train_loss),
        }
    }

    if let (Some(image), Some(label)) = (test.inputs.first(), test.labels.first()) {
        let output = network.predict(image)?;
        let predicted = output.argmax();
        println!(
            "First test image - Predicted: {}, Actual: {}, Confidence: {:.2}%",
            predicted,
            label.argmax(),
            output[(predicted, 0)] * 100.0
        );
    }

    network.save(MODEL_PATH)?;
    println!("Model saved to {MODEL_PATH}");
    Ok(())
}
