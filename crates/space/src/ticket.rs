//! Ticket record and its status state machine.

use serde::{Deserialize, Serialize};

use crate::{ConcertId, Money, TicketId, UserId};

/// The status of a ticket in its lifecycle.
///
/// State transitions:
/// ```text
/// Available ──► Reserved ──► Booked ──► Cancelled
///     ▲            │
///     └────────────┘ (compensation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    /// Ticket can be reserved.
    #[default]
    Available,

    /// Ticket is held for a user while payment is pending.
    Reserved,

    /// Ticket has been paid for.
    Booked,

    /// Booking was cancelled. No transition leaves this state.
    Cancelled,
}

impl TicketStatus {
    /// Returns true if the ticket can be reserved in this state.
    pub fn can_reserve(&self) -> bool {
        matches!(self, TicketStatus::Available)
    }

    /// Returns true if moving from this state to `next` is a single legal step.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Available, TicketStatus::Reserved)
                | (TicketStatus::Reserved, TicketStatus::Booked)
                | (TicketStatus::Reserved, TicketStatus::Available)
                | (TicketStatus::Booked, TicketStatus::Cancelled)
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Available => "Available",
            TicketStatus::Reserved => "Reserved",
            TicketStatus::Booked => "Booked",
            TicketStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concert ticket record held in the space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub concert_id: ConcertId,
    pub user_id: UserId,
    pub price: Money,
    pub status: TicketStatus,
}

impl Ticket {
    /// Creates a new ticket.
    pub fn new(
        id: impl Into<TicketId>,
        concert_id: impl Into<ConcertId>,
        user_id: impl Into<UserId>,
        price: Money,
        status: TicketStatus,
    ) -> Self {
        Self {
            id: id.into(),
            concert_id: concert_id.into(),
            user_id: user_id.into(),
            price,
            status,
        }
    }

    /// Returns a copy of this ticket with a different status.
    pub fn with_status(&self, status: TicketStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
