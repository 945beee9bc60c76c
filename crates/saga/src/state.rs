//! Lifecycle of a single saga run.

use serde::{Deserialize, Serialize};

/// Where a saga is in its single run.
///
/// ```text
/// NotStarted ─► Running ─┬─► Completed
///                        └─► Compensating { from_step } ─► Failed { at_step }
/// ```
///
/// Both failure states remember the index of the step whose `execute`
/// failed; that step is the one never compensated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    #[default]
    NotStarted,
    Running,
    Compensating { from_step: usize },
    Completed,
    Failed { at_step: usize },
}

impl SagaState {
    /// Returns true once `execute` has been called.
    pub fn has_started(&self) -> bool {
        !matches!(self, SagaState::NotStarted)
    }

    /// Returns the index of the step that failed, if any did.
    pub fn failed_step(&self) -> Option<usize> {
        match *self {
            SagaState::Compensating { from_step } => Some(from_step),
            SagaState::Failed { at_step } => Some(at_step),
            _ => None,
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SagaState::NotStarted => f.write_str("NotStarted"),
            SagaState::Running => f.write_str("Running"),
            SagaState::Compensating { from_step } => write!(f, "CompensatingFromStep({from_step})"),
            SagaState::Completed => f.write_str("Completed"),
            SagaState::Failed { at_step } => write!(f, "FailedAtStep({at_step})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_started_is_unstarted() {
        assert!(!SagaState::default().has_started());
        for state in [
            SagaState::Running,
            SagaState::Compensating { from_step: 1 },
            SagaState::Completed,
            SagaState::Failed { at_step: 1 },
        ] {
            assert!(state.has_started(), "{state}");
        }
    }

    #[test]
    fn test_failed_step_survives_compensation() {
        assert_eq!(SagaState::Running.failed_step(), None);
        assert_eq!(SagaState::Completed.failed_step(), None);
        assert_eq!(SagaState::Compensating { from_step: 2 }.failed_step(), Some(2));
        assert_eq!(SagaState::Failed { at_step: 2 }.failed_step(), Some(2));
    }

    #[test]
    fn test_display_names_the_step() {
        assert_eq!(
            SagaState::Compensating { from_step: 2 }.to_string(),
            "CompensatingFromStep(2)"
        );
        assert_eq!(SagaState::Failed { at_step: 0 }.to_string(), "FailedAtStep(0)");
        assert_eq!(SagaState::Completed.to_string(), "Completed");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&SagaState::Failed { at_step: 1 }).unwrap();
        assert_eq!(json, r#"{"Failed":{"at_step":1}}"#);
        assert_eq!(
            serde_json::from_str::<SagaState>(&json).unwrap(),
            SagaState::Failed { at_step: 1 }
        );
    }
}
