//! Error types for the Stride run-control driver.
//!
//! Organized by layer: individual maintenance tasks ([`TaskError`]),
//! the engine's stepping primitive ([`EngineError`]), and the run-family
//! operations exposed to callers ([`RunError`]).
//!
//! Early terminations (callback abort, wall-clock stop) are not errors;
//! they are reported through [`RunOutcome`](crate::RunOutcome).

use std::error::Error;
use std::fmt;

use crate::id::Step;

/// Failure of a single refresh or advance call on an engine-owned task.
///
/// Returned by [`Integrator`](crate::Integrator), [`Logger`](crate::Logger),
/// [`NeighborList`](crate::NeighborList) and [`Stepper`](crate::Stepper)
/// implementations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl TaskError {
    /// Create a task error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for TaskError {}

/// Errors from an engine's stepping primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Advancing the simulation failed at the given step. The clock
    /// stays at `step`.
    StepFailed {
        /// Step that could not be executed.
        step: Step,
        /// The underlying task failure.
        reason: TaskError,
    },
    /// The requested segment would overflow the step counter.
    ClockOverflow {
        /// Clock value when the segment was requested.
        current: Step,
        /// Requested relative step count.
        requested: u64,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepFailed { step, reason } => {
                write!(f, "step {step} failed: {reason}")
            }
            Self::ClockOverflow { current, requested } => {
                write!(
                    f,
                    "running {requested} steps from step {current} overflows the step counter"
                )
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StepFailed { reason, .. } => Some(reason),
            Self::ClockOverflow { .. } => None,
        }
    }
}

/// Errors from the run-family operations (`run`, `run_upto`, `get_step`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunError {
    /// The context has no engine yet. Fatal to the requested operation
    /// and raised before any other side effect.
    NotInitialized {
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// The run options are malformed (negative or non-finite hour
    /// limit, zero `limit_multiple`).
    InvalidRequest {
        /// Description of the rejected option.
        reason: String,
    },
    /// A maintenance task failed while priming. Nothing was stepped.
    Priming {
        /// The task that failed, e.g. `logger 'thermo'`.
        task: String,
        /// The refresh call that failed, e.g. `update_quantities`.
        action: &'static str,
        /// The underlying task failure.
        reason: TaskError,
    },
    /// The engine's stepping primitive failed.
    Engine(EngineError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized { operation } => {
                write!(f, "cannot {operation} before initialization")
            }
            Self::InvalidRequest { reason } => write!(f, "invalid run request: {reason}"),
            Self::Priming {
                task,
                action,
                reason,
            } => write!(f, "priming {task} ({action}) failed: {reason}"),
            Self::Engine(e) => write!(f, "engine: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Priming { reason, .. } => Some(reason),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for RunError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_initialized_names_operation() {
        let err = RunError::NotInitialized {
            operation: "get step",
        };
        assert_eq!(err.to_string(), "cannot get step before initialization");
    }

    #[test]
    fn priming_error_chains_task_error() {
        let err = RunError::Priming {
            task: "logger 'thermo'".to_string(),
            action: "update_quantities",
            reason: TaskError::new("quantity 'pressure' unavailable"),
        };
        let msg = err.to_string();
        assert!(msg.contains("logger 'thermo'"));
        assert!(msg.contains("update_quantities"));
        let source = err.source().expect("priming error has a source");
        assert_eq!(source.to_string(), "quantity 'pressure' unavailable");
    }

    #[test]
    fn engine_error_converts_into_run_error() {
        let err: RunError = EngineError::ClockOverflow {
            current: Step(u64::MAX),
            requested: 1,
        }
        .into();
        match &err {
            RunError::Engine(EngineError::ClockOverflow { requested: 1, .. }) => {}
            other => panic!("expected Engine(ClockOverflow), got {other:?}"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn step_failed_display_includes_step() {
        let err = EngineError::StepFailed {
            step: Step(42),
            reason: TaskError::new("NaN in positions"),
        };
        assert_eq!(err.to_string(), "step 42 failed: NaN in positions");
    }
}
