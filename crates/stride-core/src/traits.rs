//! Capability traits of the external simulation engine.
//!
//! The driver never touches physics. It sees the engine through these
//! traits only: a stepping primitive ([`StepEngine`]), the per-segment
//! maintenance tasks ([`Integrator`], [`Logger`], [`NeighborList`]),
//! and a wall-clock source ([`WallClock`]).
//!
//! All traits require `Send` so a simulation context can be moved to a
//! worker thread. None require `Sync`: a context is driven by one thread
//! at a time.

use std::time::SystemTime;

use crate::callback::CallbackController;
use crate::error::{EngineError, TaskError};
use crate::id::Step;
use crate::segment::{SegmentPlan, StopReason};

/// The engine's stepping primitive and run-wide switches.
pub trait StepEngine: Send {
    /// Current absolute step. No side effects.
    fn current_step(&self) -> Step;

    /// Advance the clock by up to `plan.steps` steps.
    ///
    /// Must poll `callback` before each step and call
    /// [`finish`](CallbackController::finish) once after the loop. Early
    /// stops for wall-clock reasons are only allowed on multiples of
    /// `plan.limit_multiple`; a run that is not time-limited always
    /// reaches `current + plan.steps` unless the callback aborts.
    fn step(
        &mut self,
        plan: &SegmentPlan,
        callback: &mut CallbackController,
    ) -> Result<StopReason, EngineError>;

    /// Configure kernel autotuning. Pass-through configuration.
    fn set_autotuner_params(&mut self, enabled: bool, period: u64);

    /// Toggle profiling instrumentation for the next segment.
    fn enable_profiler(&mut self, enabled: bool);

    /// Toggle periodic status output for the next segment.
    fn enable_quiet_run(&mut self, quiet: bool);
}

/// The active integrator's per-segment refresh hooks.
pub trait Integrator: Send {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "integrator"
    }

    /// Refresh the set of forces the integrator sums.
    fn update_forces(&mut self) -> Result<(), TaskError>;

    /// Refresh the integration methods and their groups.
    fn update_methods(&mut self) -> Result<(), TaskError>;

    /// Refresh thermodynamic quantity computes.
    fn update_thermos(&mut self) -> Result<(), TaskError>;
}

/// A registered logger that tracks a set of quantities.
pub trait Logger: Send {
    /// Re-resolve the tracked quantities against the current context.
    fn update_quantities(&mut self) -> Result<(), TaskError>;
}

/// A registered neighbor list.
pub trait NeighborList: Send {
    /// Recompute the cutoff radius from the attached pair potentials.
    fn update_rcut(&mut self) -> Result<(), TaskError>;

    /// Re-apply the default bonded exclusions.
    fn update_exclusions_defaults(&mut self) -> Result<(), TaskError>;
}

/// The per-step work of an in-process engine.
///
/// Any `FnMut(Step) -> Result<(), TaskError>` closure is a stepper.
pub trait Stepper: Send {
    /// Execute the step that advances the clock from `step` to `step + 1`.
    fn advance(&mut self, step: Step) -> Result<(), TaskError>;
}

impl<F> Stepper for F
where
    F: FnMut(Step) -> Result<(), TaskError> + Send,
{
    fn advance(&mut self, step: Step) -> Result<(), TaskError> {
        self(step)
    }
}

/// Source of absolute wall-clock time.
///
/// Deadlines are absolute (unix epoch based), so elapsed time is measured
/// on the same clock rather than on a monotonic [`Instant`](std::time::Instant).
pub trait WallClock: Send {
    /// The current wall-clock time.
    fn now(&self) -> SystemTime;
}

/// [`WallClock`] backed by [`SystemTime::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

