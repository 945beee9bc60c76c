//! Saga error types.

use space::SpaceError;
use thiserror::Error;

/// Errors that can occur during saga operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SagaError {
    /// The ticket space rejected a step's operation.
    #[error("Ticket space error: {0}")]
    Space(#[from] SpaceError),

    /// Payment service error.
    #[error("Payment service error: {0}")]
    PaymentService(String),

    /// Notification service error.
    #[error("Notification service error: {0}")]
    NotificationService(String),

    /// Saga has already been started.
    #[error("Saga has already been started")]
    AlreadyStarted,
}

impl SagaError {
    /// Returns true if the error came from an external collaborator.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            SagaError::PaymentService(_) | SagaError::NotificationService(_)
        )
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
