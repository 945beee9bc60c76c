//! Step 2: charge the customer.

use std::sync::Arc;

use async_trait::async_trait;
use common::Money;

use crate::booking::STEP_PROCESS_PAYMENT;
use crate::error::Result;
use crate::services::{PaymentGateway, PaymentInfo};
use crate::step::SagaStep;

/// Charges `amount` through a payment gateway; compensation refunds it.
pub struct PaymentStep {
    gateway: Arc<dyn PaymentGateway>,
    info: PaymentInfo,
    amount: Money,
    charged: bool,
}

impl PaymentStep {
    /// Creates a step charging `amount` for `info`.
    pub fn new(gateway: Arc<dyn PaymentGateway>, info: PaymentInfo, amount: Money) -> Self {
        Self {
            gateway,
            info,
            amount,
            charged: false,
        }
    }
}

#[async_trait]
impl SagaStep for PaymentStep {
    fn name(&self) -> &'static str {
        STEP_PROCESS_PAYMENT
    }

    async fn execute(&mut self) -> Result<()> {
        if self.charged {
            return Ok(());
        }
        self.gateway.process_payment(&self.info, self.amount).await?;
        self.charged = true;
        Ok(())
    }

    async fn compensate(&mut self) -> Result<()> {
        if !self.charged {
            return Ok(());
        }
        self.gateway.refund_payment(&self.info, self.amount).await?;
        self.charged = false;
        Ok(())
    }
}
