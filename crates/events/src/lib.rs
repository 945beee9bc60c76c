//! Domain events and the channel that distributes them.
//!
//! Events form a closed enum so subscribers match on typed payloads instead
//! of downcasting. The channel is an ordinary value: construct one per
//! process and hand it to every node that should publish on it.

pub mod channel;
pub mod event;

pub use channel::{EventChannel, EventHandler, handler_fn};
pub use event::{EventKind, TicketCancelledData, TicketEvent, TicketPurchasedData};
