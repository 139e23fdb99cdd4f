use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Every failure the engine can report to its caller.
#[derive(Debug, Error)]
pub enum NnError {
    /// Two operands of a matrix operation have incompatible shapes.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Input and label lists handed to training have different lengths.
    #[error("size mismatch: {inputs} inputs but {labels} labels")]
    SizeMismatch { inputs: usize, labels: usize },

    #[error("dataset is empty")]
    EmptyDataset,

    /// A matrix could not be built from the given data (empty or ragged rows).
    #[error("invalid matrix shape: {0}")]
    InvalidShape(String),

    #[error("invalid network configuration: {0}")]
    InvalidConfig(String),

    /// A persisted model or dataset record is malformed. `line` is 1-based.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> NnError {
        NnError::Parse { line, message: message.into() }
    }
}
