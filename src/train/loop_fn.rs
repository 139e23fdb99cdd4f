use std::time::Instant;

use rand::Rng;

use crate::data::Dataset;
use crate::error::Result;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Trains `network` for `config.epochs` epochs and returns one
/// [`EpochStats`] per completed epoch.
///
/// # Arguments
/// - `network` — modified in place
/// - `train`   — training samples
/// - `eval`    — optional held-out set; accuracy is measured on it on
///               evaluation epochs (see [`TrainConfig::eval_every`])
/// - `config`  — epoch count, evaluation cadence, optional progress channel
/// - `rng`     — drives the per-epoch shuffle
///
/// # Early termination
/// The loop stops after the current epoch if the `progress_tx` receiver has
/// been dropped.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    train: &Dataset,
    eval: Option<&Dataset>,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<EpochStats>> {
    let eval = match eval {
        Some(set) if set.is_empty() => {
            log::warn!("evaluation set is empty, accuracy will not be reported");
            None
        }
        other => other,
    };

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = network.train_epoch(&train.inputs, &train.labels, rng)?;

        let accuracy = match eval {
            Some(set) if config.is_eval_epoch(epoch) => {
                Some(network.evaluate_accuracy(&set.inputs, &set.labels)?)
            }
            _ => None,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        match stats.accuracy {
            Some(acc) => log::info!(
                "epoch {epoch}/{}: loss {train_loss:.6}, accuracy {:.2}%",
                config.epochs,
                acc * 100.0
            ),
            None => log::info!("epoch {epoch}/{}: loss {train_loss:.6}", config.epochs),
        }

        history.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                log::debug!("progress receiver dropped, stopping after epoch {epoch}");
                break;
            }
        }
    }

    Ok(history)
}
