use ferrite_mlp::data::builtin_xor;
use ferrite_mlp::{ActivationFunction, LossType, Network};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> ferrite_mlp::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut network = Network::new(
        &[2, 4, 2],
        &[ActivationFunction::Sigmoid, ActivationFunction::Softmax],
        0.5,
        LossType::CrossEntropy,
        &mut rng,
    )?;

    let data = builtin_xor();
    let epochs = 5000;

    for epoch in 0..epochs {
        let loss = network.train_epoch(&data.inputs, &data.labels, &mut rng)?;
        if epoch % 500 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for input in &data.inputs {
        let output = network.predict(input)?;
        println!(
            "Input: [{}, {}] -> class {} (p = {:.4})",
            input[(0, 0)],
            input[(1, 0)],
            output.argmax(),
            output[(output.argmax(), 0)]
        );
    }
    println!(
        "Accuracy: {:.2}",
        network.evaluate_accuracy(&data.inputs, &data.labels)?
    );
    Ok(())
}
