//! Step 4: turn the held reservation into a booking.

use async_trait::async_trait;
use space::{Ticket, TicketId, TicketSpace, TicketStatus};
use tokio::sync::oneshot;

use crate::booking::STEP_BOOK_TICKET;
use crate::error::Result;
use crate::step::SagaStep;

/// Moves a reserved ticket to `Booked`.
///
/// The booked record is handed to `receipt` once. Compensating puts the
/// ticket back to `Reserved` so the reservation's own compensation can
/// release it.
#[derive(Debug)]
pub struct BookStep {
    space: TicketSpace,
    ticket_id: TicketId,
    receipt: Option<oneshot::Sender<Ticket>>,
    booked: Option<Ticket>,
}

impl BookStep {
    /// Creates a step booking `ticket_id`. Pass a sender to learn the
    /// booked record.
    pub fn new(
        space: TicketSpace,
        ticket_id: TicketId,
        receipt: Option<oneshot::Sender<Ticket>>,
    ) -> Self {
        Self {
            space,
            ticket_id,
            receipt,
            booked: None,
        }
    }
}

#[async_trait]
impl SagaStep for BookStep {
    fn name(&self) -> &'static str {
        STEP_BOOK_TICKET
    }

    async fn execute(&mut self) -> Result<()> {
        if self.booked.is_some() {
            return Ok(());
        }

        let booked = self
            .space
            .transition(&self.ticket_id, TicketStatus::Booked)
            .await?;
        if let Some(receipt) = self.receipt.take() {
            // The caller may not be waiting for the record.
            let _ = receipt.send(booked.clone());
        }
        self.booked = Some(booked);
        Ok(())
    }

    async fn compensate(&mut self) -> Result<()> {
        if let Some(booked) = self.booked.take() {
            self.space
                .write(booked.with_status(TicketStatus::Reserved))
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space::{Money, SpaceError};

    fn reserved() -> Ticket {
        Ticket::new("T1", "C1", "U1", Money::from_dollars(50), TicketStatus::Reserved)
    }

    #[tokio::test]
    async fn test_books_reserved_ticket_and_sends_receipt() {
        let space = TicketSpace::new();
        space.write(reserved()).await;
        let (tx, mut rx) = oneshot::channel();
        let mut step = BookStep::new(space.clone(), "T1".into(), Some(tx));

        step.execute().await.unwrap();

        let booked = rx.try_recv().unwrap();
        assert_eq!(booked.status, TicketStatus::Booked);
        assert_eq!(space.read(&"T1".into()).await.unwrap(), booked);
    }

    #[tokio::test]
    async fn test_vanished_ticket_fails() {
        let space = TicketSpace::new();
        let mut step = BookStep::new(space, "T1".into(), None);

        assert_eq!(
            step.execute().await,
            Err(crate::SagaError::Space(SpaceError::NotFound("T1".into())))
        );
    }

    #[tokio::test]
    async fn test_compensate_returns_ticket_to_reserved() {
        let space = TicketSpace::new();
        space.write(reserved()).await;
        let mut step = BookStep::new(space.clone(), "T1".into(), None);
        step.execute().await.unwrap();

        step.compensate().await.unwrap();
        step.compensate().await.unwrap();

        assert_eq!(space.read(&"T1".into()).await.unwrap(), reserved());
    }
}
