//! The contract between the run driver and an engine's stepping loop.
//!
//! [`SegmentPlan`] carries everything the engine needs to execute one
//! run segment; [`StopReason`] reports why the loop ended.

use std::num::NonZeroU64;
use std::time::{Duration, SystemTime};

/// One run segment as handed to [`StepEngine::step`](crate::StepEngine::step).
///
/// The per-call `limit` and the process-wide `deadline` are independent
/// signals. The engine honors whichever constrains it first, and only
/// stops early on steps that are multiples of `limit_multiple`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Number of steps to advance.
    pub steps: u64,
    /// Per-call wall-clock cap, measured from the start of the segment.
    /// `None` means no cap.
    pub limit: Option<Duration>,
    /// Absolute wall-clock time by which stepping must have stopped.
    pub deadline: Option<SystemTime>,
    /// Step granularity at which a time-limited stop is permitted.
    pub limit_multiple: NonZeroU64,
}

impl SegmentPlan {
    /// A plan with no wall-clock constraints.
    pub fn unbounded(steps: u64) -> Self {
        Self {
            steps,
            limit: None,
            deadline: None,
            limit_multiple: NonZeroU64::MIN,
        }
    }

    /// Whether either wall-clock signal is set.
    pub fn is_time_limited(&self) -> bool {
        self.limit.is_some() || self.deadline.is_some()
    }

    /// The per-call cap expressed in hours, for diagnostics.
    pub fn limit_hours(&self) -> Option<f64> {
        self.limit.map(|d| d.as_secs_f64() / 3600.0)
    }
}

/// Which wall-clock signal ended a segment early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallClockCause {
    /// The per-call hour limit elapsed.
    LimitHours,
    /// The process-wide deadline was reached, or would have been passed
    /// before the next permitted stopping point.
    Deadline,
}

/// Why an engine's stepping loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// All requested steps were executed.
    Completed,
    /// The callback returned a negative value.
    CallbackAbort,
    /// The segment was cut short by the wall-clock budget.
    WallClockExceeded(WallClockCause),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_plan_has_no_limits() {
        let plan = SegmentPlan::unbounded(100);
        assert_eq!(plan.steps, 100);
        assert!(!plan.is_time_limited());
        assert_eq!(plan.limit_multiple.get(), 1);
        assert_eq!(plan.limit_hours(), None);
    }

    #[test]
    fn limit_hours_round_trips_seconds() {
        let plan = SegmentPlan {
            limit: Some(Duration::from_secs(5400)),
            ..SegmentPlan::unbounded(10)
        };
        assert!(plan.is_time_limited());
        assert_eq!(plan.limit_hours(), Some(1.5));
    }
}
