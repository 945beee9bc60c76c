use space::SpaceError;
use thiserror::Error;

/// Errors that can occur during node operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The local ticket space rejected the operation.
    #[error("Ticket space error: {0}")]
    Space(#[from] SpaceError),

    /// The cluster configuration cannot be assembled.
    #[error("Invalid cluster configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for node results.
pub type Result<T> = std::result::Result<T, NodeError>;
