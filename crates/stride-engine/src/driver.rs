//! The run driver: `run`, `run_upto`, and `get_step`.
//!
//! [`RunDriver`] executes one run segment against a [`SimContext`]:
//!
//! 1. readiness check and option validation;
//! 2. status line naming the caller's source location (unless quiet);
//! 3. integrator refresh, then autotuner parameters;
//! 4. logger and neighbor-list priming;
//! 5. profiler and quiet switches;
//! 6. zero-time-limit early return;
//! 7. delegation to the engine's stepping primitive with the budget and
//!    callback wired in.
//!
//! The driver never advances the clock itself and primes exactly once
//! per segment.
//!
//! # Ownership model
//!
//! Every operation takes the context explicitly. Mutating operations
//! take `&mut SimContext`, so two segments can never be in flight on one
//! context at the same time.

use std::fmt;
use std::panic::Location;
use std::time::SystemTime;

use stride_core::{
    CallbackController, RunError, RunOutcome, SkipReason, Step, StepCallback, WallClockCause,
};

use crate::budget::{Budget, WallClockBudget};
use crate::config::{ConfigError, DriverConfig};
use crate::context::SimContext;
use crate::priming::{prime_integrator, prime_tasks};

// ── RunOptions ──────────────────────────────────────────────────

/// Everything about a run request except its length.
///
/// `run` pairs it with a relative step count, `run_upto` with an
/// absolute target step. Built fresh per call; consumed by the call.
pub struct RunOptions {
    /// Enable profiling output for the segment. Default: `false`.
    pub profile: bool,
    /// Per-call wall-clock cap in hours. `None` means no cap; an explicit
    /// `0.0` means do not run. Default: `None`.
    pub limit_hours: Option<f64>,
    /// Early stops happen only on multiples of this step count. Set it to
    /// the restart-dump period. Default: 1. Must be at least 1.
    pub limit_multiple: u64,
    /// Callback period in steps; `0` calls the callback once at the end.
    /// Default: 0.
    pub callback_period: u64,
    /// Optional step observer.
    pub callback: Option<StepCallback>,
    /// Suppress status output. Default: `false`.
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            profile: false,
            limit_hours: None,
            limit_multiple: 1,
            callback_period: 0,
            callback: None,
            quiet: false,
        }
    }
}

impl RunOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable profiling.
    pub fn profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// Cap this segment at `hours` of wall-clock time.
    pub fn limit_hours(mut self, hours: f64) -> Self {
        self.limit_hours = Some(hours);
        self
    }

    /// Only stop early on multiples of `multiple`.
    pub fn limit_multiple(mut self, multiple: u64) -> Self {
        self.limit_multiple = multiple;
        self
    }

    /// Attach a step observer called every `period` steps (or once at
    /// the end when `period` is 0).
    pub fn callback<F>(mut self, period: u64, callback: F) -> Self
    where
        F: FnMut(Step) -> Option<i64> + Send + 'static,
    {
        self.callback_period = period;
        self.callback = Some(Box::new(callback));
        self
    }

    /// Suppress status output.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("profile", &self.profile)
            .field("limit_hours", &self.limit_hours)
            .field("limit_multiple", &self.limit_multiple)
            .field("callback_period", &self.callback_period)
            .field("callback", &self.callback.is_some())
            .field("quiet", &self.quiet)
            .finish()
    }
}

// ── RunDriver ───────────────────────────────────────────────────

/// Executes run segments with process-wide settings.
///
/// # Example
///
/// ```ignore
/// let driver = RunDriver::from_env()?;
/// let mut ctx = SimContext::with_engine(Box::new(engine));
/// driver.run(&mut ctx, 1_000, RunOptions::new())?;
/// let outcome = driver.run_upto(&mut ctx, Step(10_000), RunOptions::new().limit_multiple(500))?;
/// if outcome.is_deadline_stop() {
///     // write a restart file and resubmit
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RunDriver {
    config: DriverConfig,
}

impl RunDriver {
    /// Create a driver from a validated [`DriverConfig`].
    pub fn new(config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a driver with the deadline read from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(DriverConfig::from_env()?)
    }

    /// The driver's configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Current absolute step of the context's engine. No side effects.
    ///
    /// # Errors
    ///
    /// [`RunError::NotInitialized`] if the context has no engine.
    pub fn get_step(&self, ctx: &SimContext) -> Result<Step, RunError> {
        Ok(ctx.require_engine("get step")?.current_step())
    }

    /// Advance the simulation by `steps` steps.
    ///
    /// Steps accumulate across calls: `run(1000)` then `run(2000)` ends at
    /// step 3000.
    ///
    /// # Errors
    ///
    /// - [`RunError::NotInitialized`] before any side effect if the
    ///   context has no engine.
    /// - [`RunError::InvalidRequest`] for a malformed hour limit or a zero
    ///   `limit_multiple`.
    /// - [`RunError::Priming`] if a task refresh fails; nothing is stepped.
    /// - [`RunError::Engine`] if the stepping primitive fails.
    ///
    /// Callback aborts, wall-clock stops, and zero time limits are not
    /// errors; see [`RunOutcome`].
    #[track_caller]
    pub fn run(
        &self,
        ctx: &mut SimContext,
        steps: u64,
        options: RunOptions,
    ) -> Result<RunOutcome, RunError> {
        self.run_segment(ctx, steps, options, Some(Location::caller()))
    }

    /// Advance the simulation until the clock reaches `target`.
    ///
    /// If the clock is already at or past `target`, nothing runs and
    /// [`RunOutcome::Skipped`] is returned. Otherwise equivalent to
    /// `run(target - current)`, with a single status line for the call.
    ///
    /// # Errors
    ///
    /// Same as [`run()`](Self::run).
    #[track_caller]
    pub fn run_upto(
        &self,
        ctx: &mut SimContext,
        target: Step,
        options: RunOptions,
    ) -> Result<RunOutcome, RunError> {
        let caller = Location::caller();
        let current = ctx.require_engine("run_upto")?.current_step();
        WallClockBudget::compute(options.limit_hours, None, options.limit_multiple)?;
        if !options.quiet {
            status_line(caller, format_args!("run_upto({target})"));
        }

        if current >= target {
            tracing::debug!(
                "requested run up to step {target}, which has already passed (at {current}); doing nothing"
            );
            return Ok(RunOutcome::Skipped {
                step: current,
                reason: SkipReason::TargetPassed { target },
            });
        }

        self.run_segment(ctx, target.steps_since(current), options, None)
    }

    /// One run segment. `caller` is `None` when an outer call already
    /// emitted the status line.
    fn run_segment(
        &self,
        ctx: &mut SimContext,
        steps: u64,
        options: RunOptions,
        caller: Option<&'static Location<'static>>,
    ) -> Result<RunOutcome, RunError> {
        let RunOptions {
            profile,
            limit_hours,
            limit_multiple,
            callback_period,
            callback,
            quiet,
        } = options;

        let mut ready = ctx.check_ready("run")?;
        let budget = WallClockBudget::compute(limit_hours, self.config.walltime_stop, limit_multiple)?;
        if let (Some(caller), false) = (caller, quiet) {
            status_line(caller, format_args!("run({steps})"));
        }

        let integrator = prime_integrator(&mut ready)?;
        let autotuner = self.config.autotuner;
        ready
            .engine()
            .set_autotuner_params(autotuner.enabled, autotuner.period);
        prime_tasks(&mut ready, integrator)?;
        ready.engine().enable_profiler(profile);
        ready.engine().enable_quiet_run(quiet);

        let budget = match budget {
            Budget::ZeroTimeLimit => {
                tracing::warn!("requesting a run with a 0 time limit, doing nothing");
                return Ok(RunOutcome::Skipped {
                    step: ready.current_step(),
                    reason: SkipReason::ZeroTimeLimit,
                });
            }
            Budget::Bounded(budget) => budget,
        };
        if let Some(remaining) = budget.effective(SystemTime::now()) {
            tracing::debug!(
                remaining_s = remaining.as_secs(),
                "wall-clock budget for this segment: {}s",
                remaining.as_secs()
            );
        }

        if !quiet {
            tracing::info!("** starting run **");
        }
        let mut controller = CallbackController::new(callback_period, callback);
        let stop = ready.engine().step(&budget.plan(steps), &mut controller)?;
        let outcome = RunOutcome::from_stop(stop, ready.current_step());

        if !quiet {
            match outcome {
                RunOutcome::WallClockExceeded { step, cause } => {
                    let limit = match cause {
                        WallClockCause::LimitHours => "limit_hours",
                        WallClockCause::Deadline => "walltime stop",
                    };
                    tracing::info!("** run stopped at step {step}: {limit} reached **");
                }
                _ => tracing::info!("** run complete **"),
            }
        }
        Ok(outcome)
    }
}

fn status_line(caller: &Location<'_>, call: fmt::Arguments<'_>) {
    tracing::info!(
        file = caller.file(),
        line = caller.line(),
        "{}:{:03}  |  {}",
        caller.file(),
        caller.line(),
        call
    );
}
