//! Wall-clock budget for a run segment.
//!
//! Two independent signals bound a segment: the per-call `limit_hours`
//! and the process-wide deadline from [`DriverConfig`](crate::config::DriverConfig).
//! [`WallClockBudget::compute()`] validates and normalizes them; the
//! engine honors whichever fires first.
//!
//! `limit_hours` keeps "absent" and "explicit zero" apart:
//!
//! | `limit_hours` | meaning |
//! |---------------|---------|
//! | `None`        | no per-call cap |
//! | `Some(0.0)`   | do not run at all ([`Budget::ZeroTimeLimit`]) |
//! | `Some(h)`     | stop after `h` hours |

use std::num::NonZeroU64;
use std::time::{Duration, SystemTime};

use stride_core::{RunError, SegmentPlan};

/// Normalized budget signals for one segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClockBudget {
    /// Per-call cap. `None` means no cap.
    pub limit: Option<Duration>,
    /// Absolute stop time. `None` means no deadline.
    pub deadline: Option<SystemTime>,
    /// Step granularity of early stops.
    pub limit_multiple: NonZeroU64,
}

/// Result of [`WallClockBudget::compute()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Budget {
    /// `limit_hours` was explicitly zero: the segment must not run.
    ZeroTimeLimit,
    /// The segment may run within these bounds.
    Bounded(WallClockBudget),
}

impl WallClockBudget {
    /// Validate and normalize the per-call and process-wide limits.
    ///
    /// # Errors
    ///
    /// [`RunError::InvalidRequest`] if `limit_hours` is negative, NaN,
    /// infinite, or too large to represent, or if `limit_multiple` is 0.
    pub fn compute(
        limit_hours: Option<f64>,
        deadline: Option<SystemTime>,
        limit_multiple: u64,
    ) -> Result<Budget, RunError> {
        let limit_multiple =
            NonZeroU64::new(limit_multiple).ok_or_else(|| RunError::InvalidRequest {
                reason: "limit_multiple must be at least 1".to_string(),
            })?;

        let limit = match limit_hours {
            None => None,
            Some(hours) if hours == 0.0 => return Ok(Budget::ZeroTimeLimit),
            Some(hours) => Some(
                Duration::try_from_secs_f64(hours * 3600.0).map_err(|_| {
                    RunError::InvalidRequest {
                        reason: format!(
                            "limit_hours must be finite and non-negative, got {hours}"
                        ),
                    }
                })?,
            ),
        };

        Ok(Budget::Bounded(Self {
            limit,
            deadline,
            limit_multiple,
        }))
    }

    /// Time left at `now`: the smaller of the per-call cap and the time
    /// until the deadline. `None` means unbounded.
    ///
    /// A deadline in the past yields [`Duration::ZERO`].
    pub fn effective(&self, now: SystemTime) -> Option<Duration> {
        let until_deadline = self
            .deadline
            .map(|d| d.duration_since(now).unwrap_or(Duration::ZERO));
        match (self.limit, until_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The plan handed to the engine for a segment of `steps` steps.
    pub fn plan(&self, steps: u64) -> SegmentPlan {
        SegmentPlan {
            steps,
            limit: self.limit,
            deadline: self.deadline,
            limit_multiple: self.limit_multiple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::UNIX_EPOCH;

    fn bounded(budget: Budget) -> WallClockBudget {
        match budget {
            Budget::Bounded(b) => b,
            Budget::ZeroTimeLimit => panic!("expected Bounded, got ZeroTimeLimit"),
        }
    }

    #[test]
    fn explicit_zero_means_do_not_run() {
        assert_eq!(
            WallClockBudget::compute(Some(0.0), None, 1).unwrap(),
            Budget::ZeroTimeLimit
        );
        // Negative zero compares equal to zero.
        assert_eq!(
            WallClockBudget::compute(Some(-0.0), None, 1).unwrap(),
            Budget::ZeroTimeLimit
        );
    }

    #[test]
    fn absent_limit_is_unbounded() {
        let b = bounded(WallClockBudget::compute(None, None, 1).unwrap());
        assert_eq!(b.limit, None);
        assert_eq!(b.effective(SystemTime::now()), None);
    }

    #[test]
    fn hours_convert_to_seconds() {
        let b = bounded(WallClockBudget::compute(Some(0.5), None, 10).unwrap());
        assert_eq!(b.limit, Some(Duration::from_secs(1800)));
        assert_eq!(b.limit_multiple.get(), 10);
    }

    #[test]
    fn invalid_hours_are_rejected() {
        for hours in [-1.0, f64::NAN, f64::INFINITY, 1e300] {
            match WallClockBudget::compute(Some(hours), None, 1) {
                Err(RunError::InvalidRequest { .. }) => {}
                other => panic!("expected InvalidRequest for {hours}, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_limit_multiple_is_rejected() {
        match WallClockBudget::compute(None, None, 0) {
            Err(RunError::InvalidRequest { reason }) => assert!(reason.contains("limit_multiple")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn effective_takes_the_tighter_signal() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let deadline = now + Duration::from_secs(600);

        let cap_tighter = bounded(WallClockBudget::compute(Some(0.125), Some(deadline), 1).unwrap());
        assert_eq!(cap_tighter.effective(now), Some(Duration::from_secs(450)));

        let deadline_tighter =
            bounded(WallClockBudget::compute(Some(1.0), Some(deadline), 1).unwrap());
        assert_eq!(deadline_tighter.effective(now), Some(Duration::from_secs(600)));

        let deadline_only = bounded(WallClockBudget::compute(None, Some(deadline), 1).unwrap());
        assert_eq!(deadline_only.effective(now), Some(Duration::from_secs(600)));
    }

    #[test]
    fn passed_deadline_leaves_zero() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let b = bounded(
            WallClockBudget::compute(None, Some(now - Duration::from_secs(5)), 1).unwrap(),
        );
        assert_eq!(b.effective(now), Some(Duration::ZERO));
    }

    #[test]
    fn plan_carries_both_signals() {
        let deadline = UNIX_EPOCH + Duration::from_secs(42);
        let b = bounded(WallClockBudget::compute(Some(2.0), Some(deadline), 5).unwrap());
        let plan = b.plan(1000);
        assert_eq!(plan.steps, 1000);
        assert_eq!(plan.limit, Some(Duration::from_secs(7200)));
        assert_eq!(plan.deadline, Some(deadline));
        assert_eq!(plan.limit_multiple.get(), 5);
    }

    proptest! {
        #[test]
        fn positive_hours_never_collapse_to_zero_budget(hours in 1e-6f64..1e4) {
            let budget = WallClockBudget::compute(Some(hours), None, 1).unwrap();
            let bounded_with_limit = matches!(budget, Budget::Bounded(WallClockBudget { limit: Some(_), .. }));
            prop_assert!(bounded_with_limit);
        }
    }
}
