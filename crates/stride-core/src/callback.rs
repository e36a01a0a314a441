//! The mid-run step observer and its invocation contract.
//!
//! A [`CallbackController`] is built once per run segment. Its mode is
//! fixed by the period it was built with:
//!
//! - period `0`: the callback fires once, after stepping ends
//!   ([`finish`](CallbackController::finish)).
//! - period `p > 0`: the callback fires during stepping on every absolute
//!   step that is a multiple of `p` ([`poll`](CallbackController::poll)).
//!
//! A negative return value asks the engine to stop at that step.

use std::fmt;
use std::ops::ControlFlow;

use crate::id::Step;

/// User-supplied step observer.
///
/// Receives the current absolute step. Returning `Some(n)` with `n < 0`
/// aborts the segment; `None` or a non-negative value continues.
/// Called synchronously from the stepping loop, so it must be fast.
pub type StepCallback = Box<dyn FnMut(Step) -> Option<i64> + Send>;

/// Wraps an optional [`StepCallback`] for the duration of one segment.
///
/// Guarantees strictly increasing steps: a step at or below the last
/// delivered one is never passed to the callback again.
pub struct CallbackController {
    period: u64,
    callback: Option<StepCallback>,
    last_delivered: Option<Step>,
    invocations: u64,
}

impl CallbackController {
    /// Build a controller for one segment.
    pub fn new(period: u64, callback: Option<StepCallback>) -> Self {
        Self {
            period,
            callback,
            last_delivered: None,
            invocations: 0,
        }
    }

    /// A controller with no callback. Every call is a no-op.
    pub fn disabled() -> Self {
        Self::new(0, None)
    }

    /// The invocation period this controller was built with.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Whether a callback is attached.
    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    /// Number of times the callback has run in this segment.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Deliver `step` to the callback, regardless of period.
    ///
    /// Returns [`ControlFlow::Break`] when the callback returned a
    /// negative value. Steps not strictly greater than the last delivered
    /// step are skipped and continue.
    pub fn invoke(&mut self, step: Step) -> ControlFlow<()> {
        let Some(callback) = self.callback.as_mut() else {
            return ControlFlow::Continue(());
        };
        if self.last_delivered.is_some_and(|last| step <= last) {
            return ControlFlow::Continue(());
        }
        self.last_delivered = Some(step);
        self.invocations += 1;
        match callback(step) {
            Some(rv) if rv < 0 => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }

    /// Called by the engine before executing `step` during the loop.
    ///
    /// Fires only in periodic mode and only on multiples of the period.
    pub fn poll(&mut self, step: Step) -> ControlFlow<()> {
        if self.period > 0 && step.is_multiple_of(self.period) {
            self.invoke(step)
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Called by the engine once after the loop ends, with the final step.
    ///
    /// Fires only in end-of-run mode (period `0`). The return value is
    /// ignored since stepping is already over.
    pub fn finish(&mut self, step: Step) {
        if self.period == 0 {
            let _ = self.invoke(step);
        }
    }
}

impl fmt::Debug for CallbackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackController")
            .field("period", &self.period)
            .field("active", &self.callback.is_some())
            .field("last_delivered", &self.last_delivered)
            .field("invocations", &self.invocations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(seen: &Arc<Mutex<Vec<u64>>>, abort_at: Option<u64>) -> StepCallback {
        let seen = Arc::clone(seen);
        Box::new(move |step: Step| {
            seen.lock().unwrap().push(step.0);
            match abort_at {
                Some(at) if step.0 == at => Some(-1),
                _ => Some(0),
            }
        })
    }

    #[test]
    fn disabled_controller_never_breaks() {
        let mut ctl = CallbackController::disabled();
        assert!(!ctl.is_active());
        assert_eq!(ctl.poll(Step(0)), ControlFlow::Continue(()));
        ctl.finish(Step(10));
        assert_eq!(ctl.invocations(), 0);
    }

    #[test]
    fn periodic_mode_fires_on_multiples_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctl = CallbackController::new(3, Some(recording(&seen, None)));
        for s in 0..10 {
            assert_eq!(ctl.poll(Step(s)), ControlFlow::Continue(()));
        }
        ctl.finish(Step(10));
        assert_eq!(*seen.lock().unwrap(), vec![0, 3, 6, 9]);
        assert_eq!(ctl.invocations(), 4);
    }

    #[test]
    fn negative_return_breaks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctl = CallbackController::new(3, Some(recording(&seen, Some(6))));
        assert_eq!(ctl.poll(Step(3)), ControlFlow::Continue(()));
        assert_eq!(ctl.poll(Step(6)), ControlFlow::Break(()));
    }

    #[test]
    fn none_return_continues() {
        let mut ctl = CallbackController::new(1, Some(Box::new(|_| None)));
        assert_eq!(ctl.poll(Step(4)), ControlFlow::Continue(()));
        assert_eq!(ctl.invocations(), 1);
    }

    #[test]
    fn end_of_run_mode_fires_once_with_final_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctl = CallbackController::new(0, Some(recording(&seen, None)));
        for s in 0..50 {
            assert_eq!(ctl.poll(Step(s)), ControlFlow::Continue(()));
        }
        ctl.finish(Step(50));
        assert_eq!(*seen.lock().unwrap(), vec![50]);
    }

    #[test]
    fn repeated_step_is_not_delivered_twice() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctl = CallbackController::new(2, Some(recording(&seen, None)));
        let _ = ctl.poll(Step(4));
        let _ = ctl.poll(Step(4));
        let _ = ctl.poll(Step(2));
        let _ = ctl.poll(Step(6));
        assert_eq!(*seen.lock().unwrap(), vec![4, 6]);
    }

    #[test]
    fn finish_is_ignored_in_periodic_mode() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctl = CallbackController::new(5, Some(recording(&seen, None)));
        ctl.finish(Step(7));
        assert!(seen.lock().unwrap().is_empty());
    }
}
