//! The simulation clock's step counter.

use std::fmt;

/// Absolute simulation time step.
///
/// Owned and advanced by the engine. The counter is cumulative across
/// run segments: it never resets for the lifetime of an engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step(pub u64);

impl Step {
    /// Step zero, the value of a freshly initialized engine.
    pub const ZERO: Step = Step(0);

    /// The step immediately after this one.
    ///
    /// # Panics
    ///
    /// Panics on `u64` overflow. Engines check the segment end with
    /// [`checked_add`](Step::checked_add) before stepping.
    pub fn next(self) -> Step {
        Step(self.0 + 1)
    }

    /// Add a relative step count, returning `None` on overflow.
    pub fn checked_add(self, steps: u64) -> Option<Step> {
        self.0.checked_add(steps).map(Step)
    }

    /// Number of steps from `earlier` to `self`, saturating at zero.
    pub fn steps_since(self, earlier: Step) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whether this step lies on a multiple of `period`.
    ///
    /// A zero period never matches.
    pub fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 % period == 0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Step {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<Step> for u64 {
    fn from(step: Step) -> Self {
        step.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_period_never_matches() {
        assert!(!Step(0).is_multiple_of(0));
        assert!(!Step(12).is_multiple_of(0));
    }

    #[test]
    fn step_zero_is_multiple_of_everything() {
        assert!(Step::ZERO.is_multiple_of(1));
        assert!(Step::ZERO.is_multiple_of(7));
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert_eq!(Step(u64::MAX).checked_add(1), None);
        assert_eq!(Step(10).checked_add(5), Some(Step(15)));
    }

    #[test]
    fn steps_since_saturates() {
        assert_eq!(Step(5).steps_since(Step(9)), 0);
        assert_eq!(Step(9).steps_since(Step(5)), 4);
    }

    proptest! {
        #[test]
        fn multiple_matches_modulo(step in 0u64..1_000_000, period in 1u64..1_000) {
            prop_assert_eq!(Step(step).is_multiple_of(period), step % period == 0);
        }
    }
}
