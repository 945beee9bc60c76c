//! Payment gateway trait and in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::{Money, TicketId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::SagaError;

/// Who pays, and for which ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub payer: UserId,
    pub ticket_id: TicketId,
}

impl PaymentInfo {
    /// Creates payment details for `payer` buying `ticket_id`.
    pub fn new(payer: impl Into<UserId>, ticket_id: impl Into<TicketId>) -> Self {
        Self {
            payer: payer.into(),
            ticket_id: ticket_id.into(),
        }
    }
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges `amount` for the purchase described by `info`.
    async fn process_payment(&self, info: &PaymentInfo, amount: Money) -> Result<(), SagaError>;

    /// Refunds a charge previously made with the same `info`.
    async fn refund_payment(&self, info: &PaymentInfo, amount: Money) -> Result<(), SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: BTreeMap<String, (PaymentInfo, Money)>,
    next_id: u32,
    refunds: usize,
    fail_on_charge: bool,
    fail_on_refund: bool,
}

/// In-memory payment gateway for testing.
///
/// Each successful charge is kept under a sequential `PAY-nnnn` ID until it
/// is refunded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline every charge.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.write(|state| state.fail_on_charge = fail);
    }

    /// Configures the gateway to reject every refund.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.write(|state| state.fail_on_refund = fail);
    }

    /// Returns the number of active (charged, not refunded) payments.
    pub fn payment_count(&self) -> usize {
        self.read(|state| state.payments.len())
    }

    /// Returns the number of refunds issued.
    pub fn refund_count(&self) -> usize {
        self.read(|state| state.refunds)
    }

    /// Returns true if an active payment exists for `info`.
    pub fn has_payment(&self, info: &PaymentInfo) -> bool {
        self.read(|state| state.payments.values().any(|(paid, _)| paid == info))
    }

    /// Returns the IDs of the active payments in issue order.
    pub fn payment_ids(&self) -> Vec<String> {
        self.read(|state| state.payments.keys().cloned().collect())
    }

    fn read<T>(&self, f: impl FnOnce(&InMemoryPaymentState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut InMemoryPaymentState) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn process_payment(&self, info: &PaymentInfo, amount: Money) -> Result<(), SagaError> {
        self.write(|state| {
            if state.fail_on_charge {
                return Err(SagaError::PaymentService("Payment declined".to_string()));
            }

            state.next_id += 1;
            let payment_id = format!("PAY-{:04}", state.next_id);
            tracing::debug!(%payment_id, payer = %info.payer, %amount, "payment charged");
            state.payments.insert(payment_id, (info.clone(), amount));
            Ok(())
        })
    }

    async fn refund_payment(&self, info: &PaymentInfo, amount: Money) -> Result<(), SagaError> {
        self.write(|state| {
            if state.fail_on_refund {
                return Err(SagaError::PaymentService("Refund rejected".to_string()));
            }

            let payment_id = state
                .payments
                .iter()
                .find(|(_, (paid, paid_amount))| paid == info && *paid_amount == amount)
                .map(|(id, _)| id.clone());
            // Refunding an unknown charge is a no-op so compensation can be retried.
            if let Some(payment_id) = payment_id {
                state.payments.remove(&payment_id);
                state.refunds += 1;
                tracing::debug!(%payment_id, payer = %info.payer, %amount, "payment refunded");
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PaymentInfo {
        PaymentInfo::new("U1", "T1")
    }

    #[tokio::test]
    async fn test_charge_and_refund() {
        let gateway = InMemoryPaymentGateway::new();
        let amount = Money::from_cents(5000);

        gateway.process_payment(&info(), amount).await.unwrap();
        assert_eq!(gateway.payment_count(), 1);
        assert!(gateway.has_payment(&info()));

        gateway.refund_payment(&info(), amount).await.unwrap();
        assert_eq!(gateway.payment_count(), 0);
        assert_eq!(gateway.refund_count(), 1);
        assert!(!gateway.has_payment(&info()));
    }

    #[tokio::test]
    async fn test_fail_on_charge() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_charge(true);

        let result = gateway
            .process_payment(&info(), Money::from_dollars(50))
            .await;

        assert_eq!(
            result,
            Err(SagaError::PaymentService("Payment declined".to_string()))
        );
        assert_eq!(gateway.payment_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_on_refund_keeps_payment() {
        let gateway = InMemoryPaymentGateway::new();
        let amount = Money::from_dollars(50);
        gateway.process_payment(&info(), amount).await.unwrap();
        gateway.set_fail_on_refund(true);

        assert!(gateway.refund_payment(&info(), amount).await.is_err());
        assert_eq!(gateway.payment_count(), 1);
    }

    #[tokio::test]
    async fn test_refund_without_charge_is_noop() {
        let gateway = InMemoryPaymentGateway::new();

        gateway
            .refund_payment(&info(), Money::from_dollars(50))
            .await
            .unwrap();

        assert_eq!(gateway.refund_count(), 0);
    }

    #[tokio::test]
    async fn test_sequential_payment_ids() {
        let gateway = InMemoryPaymentGateway::new();
        let amount = Money::from_cents(1000);

        gateway.process_payment(&info(), amount).await.unwrap();
        gateway
            .process_payment(&PaymentInfo::new("U2", "T2"), amount)
            .await
            .unwrap();

        assert_eq!(gateway.payment_ids(), vec!["PAY-0001", "PAY-0002"]);
    }
}
