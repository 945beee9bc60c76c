//! The contract every saga step implements.

use async_trait::async_trait;

use crate::error::Result;

/// One step of a saga: an action and its semantic inverse.
///
/// Implementations are expected to be idempotent: running `execute` or
/// `compensate` twice must not corrupt state. The orchestrator does not
/// enforce this.
#[async_trait]
pub trait SagaStep: Send {
    /// Returns the step name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Performs the step's action.
    async fn execute(&mut self) -> Result<()>;

    /// Undoes a successful `execute`. Best effort: failures are reported but
    /// never retried.
    async fn compensate(&mut self) -> Result<()>;
}
