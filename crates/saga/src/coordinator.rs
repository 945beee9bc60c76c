//! Saga coordinator: runs steps in order and compensates on failure.

use std::time::Instant;

use crate::error::{Result, SagaError};
use crate::state::SagaState;
use crate::step::SagaStep;

/// An ordered list of steps executed as one unit.
///
/// Steps run strictly one after another. When a step fails, every step
/// that completed before it is compensated in reverse order and the failing
/// step's error is returned. Compensation failures are logged and counted
/// but never replace that error.
///
/// A saga runs at most once.
pub struct Saga {
    saga_type: String,
    steps: Vec<Box<dyn SagaStep>>,
    executed: usize,
    compensated: Vec<&'static str>,
    state: SagaState,
}

impl Saga {
    /// Creates an empty saga. `saga_type` is used for logs only.
    pub fn new(saga_type: impl Into<String>) -> Self {
        Self {
            saga_type: saga_type.into(),
            steps: Vec::new(),
            executed: 0,
            compensated: Vec::new(),
            state: SagaState::NotStarted,
        }
    }

    /// Appends a step.
    ///
    /// Fails with `AlreadyStarted` once [`Saga::execute`] has been called.
    pub fn add_step(&mut self, step: impl SagaStep + 'static) -> Result<()> {
        if self.state.has_started() {
            return Err(SagaError::AlreadyStarted);
        }
        self.steps.push(Box::new(step));
        Ok(())
    }

    /// Runs every step in insertion order.
    ///
    /// On failure of step `k`, steps `k-1..=0` are compensated (in that
    /// order) before the error from step `k` is returned. Step `k` itself is
    /// never compensated and later steps are never executed.
    #[tracing::instrument(skip(self), fields(saga_type = %self.saga_type, steps = self.steps.len()))]
    pub async fn execute(&mut self) -> Result<()> {
        if self.state.has_started() {
            return Err(SagaError::AlreadyStarted);
        }

        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();
        self.state = SagaState::Running;

        for index in 0..self.steps.len() {
            let step = &mut self.steps[index];
            let name = step.name();
            tracing::info!(step = name, "saga step started");

            if let Err(error) = step.execute().await {
                tracing::warn!(step = name, %error, "saga step failed");
                self.compensate(index).await;

                metrics::histogram!("saga_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                metrics::counter!("saga_failed").increment(1);
                tracing::warn!(reason = name, "saga failed");
                return Err(error);
            }

            self.executed += 1;
            tracing::info!(step = name, "saga step completed");
        }

        self.state = SagaState::Completed;
        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(duration, "saga completed successfully");
        Ok(())
    }

    /// Runs compensating transactions in reverse order of completed steps.
    async fn compensate(&mut self, failed_step: usize) {
        if self.state != SagaState::Running {
            return;
        }
        self.state = SagaState::Compensating {
            from_step: failed_step,
        };

        while self.executed > 0 {
            let index = self.executed - 1;
            let step = &mut self.steps[index];
            let name = step.name();

            match step.compensate().await {
                Ok(()) => tracing::info!(step = name, "compensation step completed"),
                Err(error) => {
                    metrics::counter!("saga_compensations_failed").increment(1);
                    tracing::warn!(step = name, %error, "compensation step failed");
                }
            }
            self.compensated.push(name);
            self.executed = index;
        }

        self.state = SagaState::Failed {
            at_step: failed_step,
        };
    }

    /// Returns the current state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the index of the step whose failure triggered compensation.
    pub fn failed_step(&self) -> Option<usize> {
        self.state.failed_step()
    }

    /// Returns the number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns how many steps have executed successfully and still stand.
    ///
    /// This is the prefix a failure would compensate; it drops back to zero
    /// once compensation has run.
    pub fn executed_count(&self) -> usize {
        self.executed
    }

    /// Returns the names of the steps that executed and still stand.
    pub fn completed_steps(&self) -> Vec<&'static str> {
        self.steps[..self.executed]
            .iter()
            .map(|step| step.name())
            .collect()
    }

    /// Returns the names of compensated steps, in the order they ran.
    pub fn compensated_steps(&self) -> &[&'static str] {
        &self.compensated
    }
}

impl std::fmt::Debug for Saga {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saga")
            .field("saga_type", &self.saga_type)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("executed", &self.executed)
            .field("state", &self.state)
            .finish()
    }
}
