//! Ticket booking saga: reserve, pay, confirm, book.

use std::sync::Arc;

use space::{SpaceError, Ticket, TicketSpace};
use tokio::sync::oneshot;

use crate::coordinator::Saga;
use crate::error::Result;
use crate::services::{NotificationService, PaymentGateway, PaymentInfo};
use crate::steps::{BookStep, ConfirmationStep, PaymentStep, ReserveStep};

/// The saga type identifier for ticket booking.
pub const SAGA_TYPE: &str = "TicketBooking";

/// Step name: Reserve the ticket in the space.
pub const STEP_RESERVE_TICKET: &str = "reserve_ticket";

/// Step name: Process payment for the ticket.
pub const STEP_PROCESS_PAYMENT: &str = "process_payment";

/// Step name: Send the booking confirmation.
pub const STEP_SEND_CONFIRMATION: &str = "send_confirmation";

/// Step name: Mark the reserved ticket as booked.
pub const STEP_BOOK_TICKET: &str = "book_ticket";

/// A request to book one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// The ticket to book. Its `user_id` pays and its `price` is charged;
    /// for a listed ticket the price must match the listing.
    pub ticket: Ticket,
    /// Where the confirmation goes.
    pub recipient: String,
}

impl BookingRequest {
    /// Creates a request that notifies the ticket's user.
    pub fn new(ticket: Ticket) -> Self {
        let recipient = ticket.user_id.to_string();
        Self { ticket, recipient }
    }

    /// Sends notifications to `recipient` instead of the ticket's user.
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }
}

/// Books tickets by running a reserve, pay, confirm, book saga against one
/// space.
#[derive(Clone)]
pub struct BookingWorkflow {
    space: TicketSpace,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationService>,
}

impl BookingWorkflow {
    /// Creates a new booking workflow.
    pub fn new(
        space: TicketSpace,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            space,
            gateway,
            notifier,
        }
    }

    /// Builds the booking saga for `request` without running it.
    pub fn saga_for(&self, request: &BookingRequest) -> Result<Saga> {
        self.assemble(request, None)
    }

    fn assemble(
        &self,
        request: &BookingRequest,
        receipt: Option<oneshot::Sender<Ticket>>,
    ) -> Result<Saga> {
        let ticket = &request.ticket;
        let mut saga = Saga::new(SAGA_TYPE);
        saga.add_step(ReserveStep::new(self.space.clone(), ticket.clone()))?;
        saga.add_step(PaymentStep::new(
            Arc::clone(&self.gateway),
            PaymentInfo::new(ticket.user_id.clone(), ticket.id.clone()),
            ticket.price,
        ))?;
        saga.add_step(ConfirmationStep::new(
            Arc::clone(&self.notifier),
            request.recipient.clone(),
        ))?;
        saga.add_step(BookStep::new(self.space.clone(), ticket.id.clone(), receipt))?;
        Ok(saga)
    }

    /// Runs the booking saga and returns the booked ticket.
    ///
    /// On failure the saga has already undone its completed steps and the
    /// failing step's error is returned.
    #[tracing::instrument(skip(self, request), fields(saga_type = SAGA_TYPE, ticket_id = %request.ticket.id))]
    pub async fn book(&self, request: BookingRequest) -> Result<Ticket> {
        let (tx, rx) = oneshot::channel();
        let mut saga = self.assemble(&request, Some(tx))?;
        saga.execute().await?;

        let booked = rx
            .await
            .map_err(|_| SpaceError::NotFound(request.ticket.id.clone()))?;
        tracing::info!(user_id = %booked.user_id, price = %booked.price, "ticket booked");
        Ok(booked)
    }
}

impl std::fmt::Debug for BookingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingWorkflow").finish_non_exhaustive()
    }
}
