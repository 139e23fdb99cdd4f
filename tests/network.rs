use std::path::PathBuf;

use ferrite_mlp::{ActivationFunction, Layer, LossType, Matrix, Network, NnError};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn col(values: &[f64]) -> Matrix {
    Matrix::column(values).unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ferrite_mlp_{}_{name}", std::process::id()))
}

fn sigmoid_net(seed: u64, learning_rate: f64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    Network::new(
        &[4, 5, 3],
        &[ActivationFunction::Sigmoid, ActivationFunction::Sigmoid],
        learning_rate,
        LossType::Mse,
        &mut rng,
    )
    .unwrap()
}

/// Identity layer mapping a 2-vector to itself, so argmax(output) == argmax(input).
fn identity_classifier() -> Network {
    let weights = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let biases = col(&[0.0, 0.0]);
    let layer = Layer::with_params(weights, biases, ActivationFunction::Identity).unwrap();
    Network::from_layers(vec![layer], 0.1, LossType::Mse).unwrap()
}

#[test]
fn repeated_training_on_one_sample_does_not_increase_loss() {
    let mut net = sigmoid_net(1, 0.05);
    let input = col(&[0.2, 0.9, 0.4, 0.1]);
    let label = col(&[1.0, 0.0, 0.0]);

    let losses: Vec<f64> = (0..100).map(|_| net.train(&input, &label).unwrap()).collect();

    for pair in losses.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "loss went up: {} -> {}", pair[0], pair[1]);
    }
    assert!(losses[99] < losses[0]);
}

#[test]
fn backprop_matches_numerical_gradient() {
    let lr = 1e-3;
    let net = sigmoid_net(2, lr);
    let input = col(&[0.5, -0.3, 0.8, 0.1]);
    let label = col(&[0.0, 1.0, 0.0]);

    let mut trained = net.clone();
    trained.train(&input, &label).unwrap();

    let h = 1e-6;
    for layer_idx in 0..2 {
        for &(r, c) in &[(0, 0), (1, 2), (2, 1)] {
            let loss_with = |delta: f64| {
                let mut layers: Vec<Layer> = net.layers().to_vec();
                let mut weights = layers[layer_idx].weights().clone();
                weights[(r, c)] += delta;
                layers[layer_idx] = Layer::with_params(
                    weights,
                    layers[layer_idx].biases().clone(),
                    layers[layer_idx].activation(),
                )
                .unwrap();
                let probe = Network::from_layers(layers, lr, LossType::Mse).unwrap();
                probe.evaluate_loss(&[input.clone()], &[label.clone()]).unwrap()
            };
            let numeric = (loss_with(h) - loss_with(-h)) / (2.0 * h);

            let before = net.layers()[layer_idx].weights()[(r, c)];
            let after = trained.layers()[layer_idx].weights()[(r, c)];
            let analytic = (before - after) / lr;

            assert!(
                (numeric - analytic).abs() < 1e-7,
                "layer {layer_idx} w[{r},{c}]: numeric {numeric} vs backprop {analytic}"
            );
        }
    }
}

#[test]
fn epoch_loss_is_measured_before_updates_and_keeps_pairs() {
    // With a zero learning rate the weights never move, so the epoch loss must
    // equal the unshuffled mean loss exactly when every input keeps its label.
    let mut net = sigmoid_net(3, 0.0);
    let inputs: Vec<Matrix> = (0..12)
        .map(|i| col(&[i as f64 / 12.0, 1.0 - i as f64 / 12.0, (i % 3) as f64, 0.5]))
        .collect();
    let labels: Vec<Matrix> = (0..12)
        .map(|i| {
            let mut one_hot = [0.0; 3];
            one_hot[i % 3] = 1.0;
            col(&one_hot)
        })
        .collect();

    let reference = net.evaluate_loss(&inputs, &labels).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..5 {
        let epoch_loss = net.train_epoch(&inputs, &labels, &mut rng).unwrap();
        assert!((epoch_loss - reference).abs() < 1e-12);
    }
}

#[test]
fn epoch_returns_loss_from_before_its_own_updates() {
    let mut net = sigmoid_net(4, 0.5);
    let inputs = vec![col(&[1.0, 0.0, 0.0, 0.0]), col(&[0.0, 1.0, 0.0, 0.0])];
    let labels = vec![col(&[1.0, 0.0, 0.0]), col(&[0.0, 1.0, 0.0])];

    let before = net.evaluate_loss(&inputs, &labels).unwrap();
    let reported = net.train_epoch(&inputs, &labels, &mut StdRng::seed_from_u64(5)).unwrap();
    let after = net.evaluate_loss(&inputs, &labels).unwrap();

    assert!((reported - before).abs() < 1e-12);
    assert!(after < before);
}

#[test]
fn mismatched_lists_are_rejected_before_training() {
    let mut net = sigmoid_net(6, 0.5);
    let snapshot = net.layers()[0].weights().clone();
    let inputs = vec![col(&[1.0, 0.0, 0.0, 0.0]), col(&[0.0, 1.0, 0.0, 0.0])];
    let labels = vec![col(&[1.0, 0.0, 0.0])];
    let mut rng = StdRng::seed_from_u64(0);

    assert!(matches!(
        net.train_epoch(&inputs, &labels, &mut rng),
        Err(NnError::SizeMismatch { inputs: 2, labels: 1 })
    ));
    assert!(matches!(net.train_batch(&inputs, &labels), Err(NnError::SizeMismatch { .. })));
    assert_eq!(net.layers()[0].weights(), &snapshot);

    assert!(matches!(net.train_epoch(&[], &[], &mut rng), Err(NnError::EmptyDataset)));
    assert!(matches!(net.evaluate_accuracy(&[], &[]), Err(NnError::EmptyDataset)));
}

#[test]
fn accuracy_is_one_when_all_match_and_zero_when_none_do() {
    let net = identity_classifier();
    let inputs = vec![col(&[0.9, 0.1]), col(&[0.2, 0.8]), col(&[1.0, 0.0])];
    let matching = vec![col(&[1.0, 0.0]), col(&[0.0, 1.0]), col(&[1.0, 0.0])];
    let swapped = vec![col(&[0.0, 1.0]), col(&[1.0, 0.0]), col(&[0.0, 1.0])];

    assert_eq!(net.evaluate_accuracy(&inputs, &matching).unwrap(), 1.0);
    assert_eq!(net.evaluate_accuracy(&inputs, &swapped).unwrap(), 0.0);
    let mixed = vec![col(&[1.0, 0.0]), col(&[1.0, 0.0]), col(&[1.0, 0.0])];
    assert!((net.evaluate_accuracy(&inputs, &mixed).unwrap() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn accuracy_ties_resolve_to_first_class() {
    let net = identity_classifier();
    let inputs = vec![col(&[0.5, 0.5])];
    assert_eq!(net.evaluate_accuracy(&inputs, &[col(&[1.0, 0.0])]).unwrap(), 1.0);
    assert_eq!(net.evaluate_accuracy(&inputs, &[col(&[0.0, 1.0])]).unwrap(), 0.0);
}

#[test]
fn forward_and_predict_agree() {
    let net = sigmoid_net(7, 0.1);
    let input = col(&[0.1, 0.2, 0.3, 0.4]);
    let out = net.forward(&input).unwrap();
    assert_eq!(out.shape(), (3, 1));
    assert_eq!(net.predict(&input).unwrap(), out);
    assert!(net.forward(&col(&[0.1, 0.2])).is_err());
}

#[test]
fn save_then_load_restores_parameters_exactly() {
    let mut rng = StdRng::seed_from_u64(8);
    let activations = [ActivationFunction::ReLU, ActivationFunction::Softmax];
    let mut net = Network::new(&[6, 5, 3], &activations, 0.0125, LossType::CrossEntropy, &mut rng).unwrap();
    let input = col(&[0.3, 0.1, 0.4, 0.1, 0.5, 0.9]);
    net.train(&input, &col(&[0.0, 0.0, 1.0])).unwrap();

    let path = temp_path("roundtrip.txt");
    net.save(&path).unwrap();

    let mut restored = Network::new(&[6, 5, 3], &activations, 0.5, LossType::CrossEntropy, &mut rng).unwrap();
    restored.load(&path, &activations).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(restored.learning_rate(), 0.0125);
    for (a, b) in restored.layers().iter().zip(net.layers()) {
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
        assert_eq!(a.activation(), b.activation());
    }
    assert_eq!(restored.predict(&input).unwrap(), net.predict(&input).unwrap());
}

#[test]
fn failed_load_leaves_network_untouched() {
    let mut net = sigmoid_net(9, 0.1);
    let original = net.layers()[1].weights().clone();
    let acts = [ActivationFunction::Sigmoid, ActivationFunction::Sigmoid];

    let path = temp_path("truncated.txt");
    std::fs::write(&path, "0.1\n2\n5 4\n0 0 0 0\n").unwrap();
    let result = net.load(&path, &acts);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(NnError::Parse { .. })));
    assert_eq!(net.learning_rate(), 0.1);
    assert_eq!(net.layers()[1].weights(), &original);

    assert!(matches!(
        net.load(temp_path("does_not_exist.txt"), &acts),
        Err(NnError::Io(_))
    ));
}

#[test]
fn oversized_matrix_header_fails_to_load() {
    let mut net = sigmoid_net(12, 0.1);
    let original = net.layers()[0].weights().clone();
    let acts = [ActivationFunction::Sigmoid];

    for (name, text) in [
        ("overflow.txt", "0.1\n1\n4294967296 4294967297\n1\n"),
        ("huge.txt", "0.1\n1\n100000 100000\n0\n"),
    ] {
        let path = temp_path(name);
        std::fs::write(&path, text).unwrap();
        let result = net.load(&path, &acts);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(NnError::Parse { .. })), "{name}: {result:?}");
    }
    assert_eq!(net.layers()[0].weights(), &original);
}

#[test]
fn json_round_trip_keeps_activations_and_loss() {
    let mut rng = StdRng::seed_from_u64(10);
    let activations = [ActivationFunction::LeakyReLU { alpha: 0.01 }, ActivationFunction::Softmax];
    let net = Network::new(&[3, 4, 2], &activations, 0.2, LossType::CrossEntropy, &mut rng).unwrap();

    let path = temp_path("model.json");
    net.save_json(&path).unwrap();
    let restored = Network::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(restored.loss_type(), LossType::CrossEntropy);
    assert_eq!(restored.learning_rate(), 0.2);
    for (a, b) in restored.layers().iter().zip(net.layers()) {
        assert_eq!(a.activation(), b.activation());
        assert_eq!(a.weights(), b.weights());
    }
}

#[test]
fn softmax_cross_entropy_learns_a_separable_problem() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut net = Network::new(
        &[2, 2],
        &[ActivationFunction::Softmax],
        0.5,
        LossType::CrossEntropy,
        &mut rng,
    )
    .unwrap();
    let inputs = vec![col(&[0.0, 0.0]), col(&[0.0, 1.0]), col(&[1.0, 0.0]), col(&[1.0, 1.0])];
    let labels = vec![col(&[1.0, 0.0]), col(&[1.0, 0.0]), col(&[1.0, 0.0]), col(&[0.0, 1.0])];

    let first = net.train_epoch(&inputs, &labels, &mut rng).unwrap();
    let mut last = first;
    for _ in 0..500 {
        last = net.train_epoch(&inputs, &labels, &mut rng).unwrap();
    }

    assert!(last < first);
    assert_eq!(net.evaluate_accuracy(&inputs, &labels).unwrap(), 1.0);
}
