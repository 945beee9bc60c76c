//! In-memory ticket space.
//!
//! The space is the shared mutable state of a node: a keyed container of
//! ticket records guarded by a single-writer/multi-reader lock. Records are
//! always replaced whole, so a concurrent reader never observes a partially
//! written ticket.

pub mod error;
pub mod store;
pub mod ticket;

pub use common::{ConcertId, Money, TicketId, UserId};
pub use error::{Result, SpaceError};
pub use store::TicketSpace;
pub use ticket::{Ticket, TicketStatus};
