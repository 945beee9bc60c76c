use space::TicketId;

/// Source of IDs for newly purchased tickets.
pub trait TicketIds: Send + Sync {
    /// Returns the ID for the next ticket.
    fn next_id(&self) -> TicketId;
}

/// Mints a fresh random ID for every ticket.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTicketIds;

impl TicketIds for RandomTicketIds {
    fn next_id(&self) -> TicketId {
        TicketId::new()
    }
}
