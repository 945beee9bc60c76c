//! Step 1: hold the ticket in the space.

use async_trait::async_trait;
use space::{Ticket, TicketSpace};

use crate::booking::STEP_RESERVE_TICKET;
use crate::error::Result;
use crate::step::SagaStep;

/// What compensation has to do to put the space back.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Undo {
    /// The ticket did not exist before; remove it.
    Delete,
    /// The ticket existed as `Available`; write this record back.
    Restore(Ticket),
}

/// Reserves a ticket.
///
/// Executing writes the ticket as `Reserved`, which fails if another holder
/// already reserved or booked it. Compensating restores whatever was there
/// before. Compensating a step that never executed does nothing.
#[derive(Debug)]
pub struct ReserveStep {
    space: TicketSpace,
    ticket: Ticket,
    undo: Option<Undo>,
}

impl ReserveStep {
    /// Creates a step reserving `ticket` in `space`.
    pub fn new(space: TicketSpace, ticket: Ticket) -> Self {
        Self {
            space,
            ticket,
            undo: None,
        }
    }
}

#[async_trait]
impl SagaStep for ReserveStep {
    fn name(&self) -> &'static str {
        STEP_RESERVE_TICKET
    }

    async fn execute(&mut self) -> Result<()> {
        if self.undo.is_some() {
            return Ok(());
        }

        let prior = self.space.reserve(self.ticket.clone()).await?;
        self.undo = Some(match prior {
            Some(ticket) => Undo::Restore(ticket),
            None => Undo::Delete,
        });
        Ok(())
    }

    async fn compensate(&mut self) -> Result<()> {
        match self.undo.take() {
            Some(Undo::Delete) => self.space.delete(&self.ticket.id).await,
            Some(Undo::Restore(prior)) => self.space.write(prior).await,
            None => {}
        }
        Ok(())
    }
}
