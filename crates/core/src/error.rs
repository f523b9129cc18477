use thiserror::Error;

/// Errors that can occur in Ghost Lab domain types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GhostLabError {
    #[error("Invalid move distribution: {0}")]
    InvalidDistribution(String),

    #[error("Unknown move: {0}")]
    UnknownMove(String),

    #[error("Unknown ghost: {0}")]
    UnknownGhost(String),
}

/// Convenience Result type for Ghost Lab operations
pub type Result<T> = std::result::Result<T, GhostLabError>;
