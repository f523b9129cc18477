use ghostlab_core::GhostLabError;
use thiserror::Error;

/// Errors raised by the neural ghost controller stack
#[derive(Error, Debug)]
pub enum NetError {
    #[error("dimension mismatch in {what}: expected {expected}, got {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("training data is empty")]
    EmptyDataset,

    #[error("no legal moves to choose from")]
    NoLegalMoves,

    #[error("{0} is not a neural network ghost controller")]
    NotNeural(&'static str),

    #[error("controller asks for pretrained weights but no weights file was given")]
    MissingPretrainedWeights,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode weights: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode weights: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error(transparent)]
    Core(#[from] GhostLabError),
}

/// Convenience Result type for network operations
pub type Result<T> = std::result::Result<T, NetError>;
