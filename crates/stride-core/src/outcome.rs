//! How a run-family call ended, when it did not fail.

use crate::id::Step;
use crate::segment::{StopReason, WallClockCause};

/// Why a run request executed no steps at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// `limit_hours` was explicitly zero.
    ZeroTimeLimit,
    /// `run_upto` was asked for a step the clock has already reached.
    TargetPassed {
        /// The requested absolute step.
        target: Step,
    },
}

/// Non-error result of `run` or `run_upto`.
///
/// A wall-clock stop is a distinct variant so restart tooling can tell
/// "stopped for time" apart from "stopped because done".
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// Every requested step was executed.
    Completed {
        /// Clock value after the segment.
        step: Step,
    },
    /// The callback returned a negative value at `step`.
    CallbackAbort {
        /// Step at which stepping halted.
        step: Step,
    },
    /// The segment was cut short by the wall-clock budget.
    WallClockExceeded {
        /// Step at which stepping halted.
        step: Step,
        /// Which budget signal fired.
        cause: WallClockCause,
    },
    /// No steps were executed.
    Skipped {
        /// Unchanged clock value.
        step: Step,
        /// Why the request was a no-op.
        reason: SkipReason,
    },
}

impl RunOutcome {
    /// Combine an engine's [`StopReason`] with the clock value after it.
    pub fn from_stop(reason: StopReason, step: Step) -> Self {
        match reason {
            StopReason::Completed => Self::Completed { step },
            StopReason::CallbackAbort => Self::CallbackAbort { step },
            StopReason::WallClockExceeded(cause) => Self::WallClockExceeded { step, cause },
        }
    }

    /// Clock value when the call returned.
    pub fn final_step(&self) -> Step {
        match *self {
            Self::Completed { step }
            | Self::CallbackAbort { step }
            | Self::WallClockExceeded { step, .. }
            | Self::Skipped { step, .. } => step,
        }
    }

    /// Whether every requested step ran.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether the wall-clock budget ended the segment.
    pub fn is_wall_clock_stop(&self) -> bool {
        matches!(self, Self::WallClockExceeded { .. })
    }

    /// Whether the process-wide deadline ended the segment. Job scripts
    /// typically exit and resubmit on this.
    pub fn is_deadline_stop(&self) -> bool {
        matches!(
            self,
            Self::WallClockExceeded {
                cause: WallClockCause::Deadline,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_stop_maps_every_reason() {
        assert_eq!(
            RunOutcome::from_stop(StopReason::Completed, Step(10)),
            RunOutcome::Completed { step: Step(10) }
        );
        assert_eq!(
            RunOutcome::from_stop(StopReason::CallbackAbort, Step(6)),
            RunOutcome::CallbackAbort { step: Step(6) }
        );
        assert_eq!(
            RunOutcome::from_stop(
                StopReason::WallClockExceeded(WallClockCause::Deadline),
                Step(40)
            ),
            RunOutcome::WallClockExceeded {
                step: Step(40),
                cause: WallClockCause::Deadline,
            }
        );
    }

    #[test]
    fn wall_clock_stop_is_not_complete() {
        let outcome = RunOutcome::WallClockExceeded {
            step: Step(20),
            cause: WallClockCause::LimitHours,
        };
        assert!(!outcome.is_complete());
        assert!(outcome.is_wall_clock_stop());
        assert!(!outcome.is_deadline_stop());
        assert_eq!(outcome.final_step(), Step(20));
    }

    #[test]
    fn skipped_reports_unchanged_step() {
        let outcome = RunOutcome::Skipped {
            step: Step(100),
            reason: SkipReason::TargetPassed { target: Step(50) },
        };
        assert_eq!(outcome.final_step(), Step(100));
        assert!(!outcome.is_complete());
        assert!(!outcome.is_wall_clock_stop());
    }
}
