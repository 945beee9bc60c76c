//! Notification service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::SagaError;

/// A message sent to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Confirmation(String),
    Cancellation(String),
}

impl Notification {
    /// Returns the recipient of the message.
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Confirmation(recipient) | Notification::Cancellation(recipient) => {
                recipient
            }
        }
    }
}

/// Trait for customer notification operations.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Tells `recipient` their booking went through.
    async fn send_confirmation(&self, recipient: &str) -> Result<(), SagaError>;

    /// Tells `recipient` an earlier confirmation no longer holds.
    async fn send_cancellation(&self, recipient: &str) -> Result<(), SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<Notification>,
    fail_on_confirmation: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on every confirmation.
    pub fn set_fail_on_confirmation(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_confirmation = fail;
    }

    /// Returns every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clone()
    }

    /// Returns the number of confirmations sent.
    pub fn confirmation_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|n| matches!(n, Notification::Confirmation(_)))
            .count()
    }

    fn record(&self, notification: Notification) {
        tracing::debug!(recipient = notification.recipient(), ?notification, "notification sent");
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .push(notification);
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_confirmation(&self, recipient: &str) -> Result<(), SagaError> {
        let failing = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_confirmation;
        if failing {
            return Err(SagaError::NotificationService(format!(
                "Could not reach {recipient}"
            )));
        }

        self.record(Notification::Confirmation(recipient.to_string()));
        Ok(())
    }

    async fn send_cancellation(&self, recipient: &str) -> Result<(), SagaError> {
        self.record(Notification::Cancellation(recipient.to_string()));
        Ok(())
    }
}
