use thiserror::Error;

use crate::{Money, TicketId, TicketStatus};

/// Errors that can occur when interacting with the ticket space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// No ticket is stored under the given ID.
    #[error("Ticket not found: {0}")]
    NotFound(TicketId),

    /// The ticket is not in the status required for the requested transition.
    #[error("Invalid ticket state for {id}: {actual} cannot become {requested}")]
    InvalidState {
        id: TicketId,
        actual: TicketStatus,
        requested: TicketStatus,
    },

    /// A reservation quoted a different price than the listed ticket.
    #[error("Price mismatch for {id}: listed at {listed}, requested at {requested}")]
    PriceMismatch {
        id: TicketId,
        listed: Money,
        requested: Money,
    },
}

/// Result type for ticket space operations.
pub type Result<T> = std::result::Result<T, SpaceError>;
