use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss, measured before this epoch's updates.
    pub train_loss: f64,
    /// Accuracy on the evaluation set as a fraction in [0, 1]; only set on
    /// evaluation epochs.
    pub accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
