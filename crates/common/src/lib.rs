//! Shared identifier and value types used across the ticket space crates.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{ConcertId, NodeId, TicketId, UserId};
