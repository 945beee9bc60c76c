//! Step 3: tell the customer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::booking::STEP_SEND_CONFIRMATION;
use crate::error::Result;
use crate::services::NotificationService;
use crate::step::SagaStep;

/// Sends a booking confirmation; compensation sends a cancellation notice.
pub struct ConfirmationStep {
    notifier: Arc<dyn NotificationService>,
    recipient: String,
    sent: bool,
}

impl ConfirmationStep {
    /// Creates a step confirming to `recipient`.
    pub fn new(notifier: Arc<dyn NotificationService>, recipient: impl Into<String>) -> Self {
        Self {
            notifier,
            recipient: recipient.into(),
            sent: false,
        }
    }
}

#[async_trait]
impl SagaStep for ConfirmationStep {
    fn name(&self) -> &'static str {
        STEP_SEND_CONFIRMATION
    }

    async fn execute(&mut self) -> Result<()> {
        if self.sent {
            return Ok(());
        }
        self.notifier.send_confirmation(&self.recipient).await?;
        self.sent = true;
        Ok(())
    }

    async fn compensate(&mut self) -> Result<()> {
        if !self.sent {
            return Ok(());
        }
        self.notifier.send_cancellation(&self.recipient).await?;
        self.sent = false;
        Ok(())
    }
}
