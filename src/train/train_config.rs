use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `eval_every`  — evaluate accuracy every this many epochs (the final
///                   epoch is always evaluated); `0` evaluates only at the end
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates early.
pub struct TrainConfig {
    pub epochs: usize,
    pub eval_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel.
    pub fn new(epochs: usize, eval_every: usize) -> Self {
        TrainConfig { epochs, eval_every, progress_tx: None }
    }

    pub(crate) fn is_eval_epoch(&self, epoch: usize) -> bool {
        epoch == self.epochs || (self.eval_every > 0 && epoch % self.eval_every == 0)
    }
}
