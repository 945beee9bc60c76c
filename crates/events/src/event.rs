use chrono::{DateTime, Utc};
use common::{ConcertId, NodeId, TicketId, UserId};
use serde::{Deserialize, Serialize};

/// Routing key for subscriptions: one per [`TicketEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    TicketPurchased,
    TicketCancelled,
}

impl EventKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TicketPurchased => "TicketPurchased",
            EventKind::TicketCancelled => "TicketCancelled",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events announced by nodes after a local state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TicketEvent {
    /// A ticket was purchased on a node.
    TicketPurchased(TicketPurchasedData),

    /// A ticket was cancelled on a node.
    TicketCancelled(TicketCancelledData),
}

impl TicketEvent {
    /// Creates a `TicketPurchased` event.
    pub fn purchased(
        origin: NodeId,
        ticket_id: TicketId,
        concert_id: ConcertId,
        user_id: UserId,
    ) -> Self {
        TicketEvent::TicketPurchased(TicketPurchasedData {
            origin,
            ticket_id,
            concert_id,
            user_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a `TicketCancelled` event.
    pub fn cancelled(origin: NodeId, ticket_id: TicketId) -> Self {
        TicketEvent::TicketCancelled(TicketCancelledData {
            origin,
            ticket_id,
            occurred_at: Utc::now(),
        })
    }

    /// Returns the routing kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            TicketEvent::TicketPurchased(_) => EventKind::TicketPurchased,
            TicketEvent::TicketCancelled(_) => EventKind::TicketCancelled,
        }
    }

    /// Returns the ticket this event is about.
    pub fn ticket_id(&self) -> &TicketId {
        match self {
            TicketEvent::TicketPurchased(data) => &data.ticket_id,
            TicketEvent::TicketCancelled(data) => &data.ticket_id,
        }
    }
}

/// Data for TicketPurchased event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPurchasedData {
    /// The node that handled the purchase.
    pub origin: NodeId,
    pub ticket_id: TicketId,
    pub concert_id: ConcertId,
    pub user_id: UserId,
    /// When the purchase was applied locally.
    pub occurred_at: DateTime<Utc>,
}

/// Data for TicketCancelled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCancelledData {
    /// The node that handled the cancellation.
    pub origin: NodeId,
    pub ticket_id: TicketId,
    /// When the cancellation was applied locally.
    pub occurred_at: DateTime<Utc>,
}
