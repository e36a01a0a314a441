//! Recording fakes for the engine capability traits.
//!
//! - [`RecordingEngine`]: counts steps, honors callbacks, records plans.
//! - [`RecordingIntegrator`], [`RecordingLogger`], [`RecordingNeighborList`]:
//!   record each refresh call, optionally failing on one.
//! - [`NoopStepper`], [`ClockedStepper`]: per-step work for a real engine.

use std::ops::ControlFlow;
use std::time::Duration;

use stride_core::{
    CallbackController, EngineError, Integrator, Logger, NeighborList, SegmentPlan, Step,
    StepEngine, Stepper, StopReason, TaskError,
};

use crate::{Event, Journal, ManualClock};

// ── Engine ──────────────────────────────────────────────────────

/// A [`StepEngine`] that just counts.
///
/// Records configuration calls and each requested [`SegmentPlan`] in its
/// journal. Ignores wall-clock signals unless told to stop early with
/// [`stopping_with`](RecordingEngine::stopping_with).
pub struct RecordingEngine {
    current: Step,
    journal: Journal,
    forced_stop: Option<(StopReason, u64)>,
}

impl RecordingEngine {
    pub fn new(journal: Journal) -> Self {
        Self::starting_at(Step::ZERO, journal)
    }

    pub fn starting_at(step: Step, journal: Journal) -> Self {
        Self {
            current: step,
            journal,
            forced_stop: None,
        }
    }

    /// End every segment with `reason` after at most `after` steps.
    pub fn stopping_with(mut self, reason: StopReason, after: u64) -> Self {
        self.forced_stop = Some((reason, after));
        self
    }
}

impl StepEngine for RecordingEngine {
    fn current_step(&self) -> Step {
        self.current
    }

    fn step(
        &mut self,
        plan: &SegmentPlan,
        callback: &mut CallbackController,
    ) -> Result<StopReason, EngineError> {
        self.journal.record(Event::Step(*plan));
        let end = self
            .current
            .checked_add(plan.steps)
            .ok_or(EngineError::ClockOverflow {
                current: self.current,
                requested: plan.steps,
            })?;
        let stop_at = self
            .forced_stop
            .and_then(|(_, after)| self.current.checked_add(after));

        while self.current < end {
            if let (Some(at), Some((reason, _))) = (stop_at, self.forced_stop) {
                if self.current >= at {
                    return Ok(reason);
                }
            }
            if callback.poll(self.current) == ControlFlow::Break(()) {
                return Ok(StopReason::CallbackAbort);
            }
            self.current = self.current.next();
        }

        callback.finish(self.current);
        Ok(StopReason::Completed)
    }

    fn set_autotuner_params(&mut self, enabled: bool, period: u64) {
        self.journal.record(Event::Autotuner { enabled, period });
    }

    fn enable_profiler(&mut self, enabled: bool) {
        self.journal.record(Event::Profiler(enabled));
    }

    fn enable_quiet_run(&mut self, quiet: bool) {
        self.journal.record(Event::QuietRun(quiet));
    }
}

// ── Periodic tasks ──────────────────────────────────────────────

fn refresh(journal: &Journal, event: Event, fails: bool) -> Result<(), TaskError> {
    let what = format!("{event:?}");
    journal.record(event);
    if fails {
        Err(TaskError::new(format!("injected failure in {what}")))
    } else {
        Ok(())
    }
}

/// Integrator that records its refresh calls.
pub struct RecordingIntegrator {
    journal: Journal,
    fail_on: Option<&'static str>,
}

impl RecordingIntegrator {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_on: None,
        }
    }

    /// Fail the call named `action` (`"update_forces"`, `"update_methods"`
    /// or `"update_thermos"`) after recording it.
    pub fn failing_on(action: &'static str, journal: Journal) -> Self {
        Self {
            journal,
            fail_on: Some(action),
        }
    }

    fn call(&self, action: &'static str, event: Event) -> Result<(), TaskError> {
        refresh(&self.journal, event, self.fail_on == Some(action))
    }
}

impl Integrator for RecordingIntegrator {
    fn name(&self) -> &str {
        "recording"
    }

    fn update_forces(&mut self) -> Result<(), TaskError> {
        self.call("update_forces", Event::UpdateForces)
    }

    fn update_methods(&mut self) -> Result<(), TaskError> {
        self.call("update_methods", Event::UpdateMethods)
    }

    fn update_thermos(&mut self) -> Result<(), TaskError> {
        self.call("update_thermos", Event::UpdateThermos)
    }
}

/// Logger that records its refresh calls under its name.
pub struct RecordingLogger {
    name: String,
    journal: Journal,
    fails: bool,
}

impl RecordingLogger {
    pub fn new(name: impl Into<String>, journal: Journal) -> Self {
        Self {
            name: name.into(),
            journal,
            fails: false,
        }
    }

    /// A logger whose refresh always fails.
    pub fn failing(name: impl Into<String>, journal: Journal) -> Self {
        Self {
            fails: true,
            ..Self::new(name, journal)
        }
    }
}

impl Logger for RecordingLogger {
    fn update_quantities(&mut self) -> Result<(), TaskError> {
        refresh(
            &self.journal,
            Event::UpdateQuantities(self.name.clone()),
            self.fails,
        )
    }
}

/// Neighbor list that records its refresh calls under its name.
pub struct RecordingNeighborList {
    name: String,
    journal: Journal,
}

impl RecordingNeighborList {
    pub fn new(name: impl Into<String>, journal: Journal) -> Self {
        Self {
            name: name.into(),
            journal,
        }
    }
}

impl NeighborList for RecordingNeighborList {
    fn update_rcut(&mut self) -> Result<(), TaskError> {
        refresh(&self.journal, Event::UpdateRcut(self.name.clone()), false)
    }

    fn update_exclusions_defaults(&mut self) -> Result<(), TaskError> {
        refresh(
            &self.journal,
            Event::UpdateExclusions(self.name.clone()),
            false,
        )
    }
}

// ── Steppers ────────────────────────────────────────────────────

/// Stepper that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStepper;

impl Stepper for NoopStepper {
    fn advance(&mut self, _step: Step) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Stepper that moves a [`ManualClock`] forward by a fixed amount per
/// step, simulating a known throughput.
#[derive(Clone, Debug)]
pub struct ClockedStepper {
    clock: ManualClock,
    per_step: Duration,
}

impl ClockedStepper {
    pub fn new(clock: ManualClock, per_step: Duration) -> Self {
        Self { clock, per_step }
    }
}

impl Stepper for ClockedStepper {
    fn advance(&mut self, _step: Step) -> Result<(), TaskError> {
        self.clock.advance(self.per_step);
        Ok(())
    }
}
