pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{ForwardCache, Layer};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use loss::{CrossEntropyLoss, LossType, MseLoss};
pub use optim::sgd::Sgd;
pub use data::Dataset;
pub use train::{train_loop, EpochStats, TrainConfig};
