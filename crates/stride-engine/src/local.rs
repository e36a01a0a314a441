//! In-process stepping engine.
//!
//! [`LocalEngine`] owns a simulation clock and advances it one step at a
//! time through a [`Stepper`]. It implements the full [`StepEngine`]
//! contract:
//!
//! - the callback is polled before every step and finished once after
//!   the loop;
//! - on steps that are multiples of `limit_multiple`, the per-call cap
//!   and the deadline are checked. The deadline check is predictive: the
//!   loop stops if, at the measured throughput, the next permitted
//!   stopping point would land past the deadline;
//! - a status line is logged every [`EngineConfig::status_period`] unless
//!   the run is quiet, and a profile summary after the loop when
//!   profiling is enabled.
//!
//! Time is read from an injectable [`WallClock`] so budget behavior can
//! be tested deterministically.

use std::time::{Duration, SystemTime};

use stride_core::{
    CallbackController, EngineError, SegmentPlan, Step, StepEngine, Stepper, StopReason,
    SystemClock, WallClock, WallClockCause,
};

use crate::config::{AutotunerConfig, ConfigError, EngineConfig};
use crate::metrics::RunStats;

/// Single-threaded engine advancing a [`Stepper`].
pub struct LocalEngine {
    config: EngineConfig,
    stepper: Box<dyn Stepper>,
    clock: Box<dyn WallClock>,
    current: Step,
    autotuner: AutotunerConfig,
    profile: bool,
    quiet: bool,
    last_run: Option<RunStats>,
}

impl LocalEngine {
    /// Create an engine at step 0 reading the system clock.
    pub fn new(config: EngineConfig, stepper: Box<dyn Stepper>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            stepper,
            clock: Box::new(SystemClock),
            current: Step::ZERO,
            autotuner: AutotunerConfig::default(),
            profile: false,
            quiet: false,
            last_run: None,
        })
    }

    /// Replace the wall-clock source.
    pub fn with_clock(mut self, clock: Box<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start the clock at `step`, e.g. when resuming from a restart file.
    pub fn with_initial_step(mut self, step: Step) -> Self {
        self.current = step;
        self
    }

    /// Autotuner parameters most recently applied.
    pub fn autotuner(&self) -> AutotunerConfig {
        self.autotuner
    }

    /// Whether profiling is enabled for the next segment.
    pub fn profiler_enabled(&self) -> bool {
        self.profile
    }

    /// Whether status output is suppressed for the next segment.
    pub fn quiet_run(&self) -> bool {
        self.quiet
    }

    /// Metrics of the most recent segment that did not fail.
    pub fn last_run(&self) -> Option<&RunStats> {
        self.last_run.as_ref()
    }

    fn stats(&self, start_step: Step, started_at: SystemTime, now: SystemTime) -> RunStats {
        RunStats {
            start_step,
            end_step: self.current,
            elapsed: elapsed_between(started_at, now),
        }
    }

    /// Decide whether the budget ends the segment at the current step.
    fn wall_clock_stop(
        &self,
        plan: &SegmentPlan,
        stats: &RunStats,
        now: SystemTime,
    ) -> Option<WallClockCause> {
        if let Some(limit) = plan.limit {
            if stats.elapsed > limit {
                tracing::warn!(
                    step = %self.current,
                    "ending run at step {} as {} hours have passed",
                    self.current,
                    plan.limit_hours().unwrap_or_default(),
                );
                return Some(WallClockCause::LimitHours);
            }
        }
        if let Some(deadline) = plan.deadline {
            let per_step = if stats.steps() > 0 {
                stats.elapsed.as_secs_f64() / stats.steps() as f64
            } else {
                0.0
            };
            let projected = Duration::try_from_secs_f64(
                per_step * plan.limit_multiple.get() as f64,
            )
            .unwrap_or(Duration::MAX);
            let passes_deadline = now
                .checked_add(projected)
                .map_or(true, |next_stop| next_stop >= deadline);
            if passes_deadline {
                tracing::warn!(
                    step = %self.current,
                    "ending run at step {}: wall-clock deadline reached",
                    self.current,
                );
                return Some(WallClockCause::Deadline);
            }
        }
        None
    }

    fn emit_status(&self, stats: &RunStats, end: Step) {
        let eta = stats
            .eta(end)
            .map(|d| format!("{}s", d.as_secs()))
            .unwrap_or_else(|| "-".to_string());
        tracing::info!(
            step = %self.current,
            end = %end,
            "Time {}s | Step {} / {} | TPS {:.4} | ETA {}",
            stats.elapsed.as_secs(),
            self.current,
            end,
            stats.steps_per_second(),
            eta,
        );
    }
}

fn elapsed_between(earlier: SystemTime, later: SystemTime) -> Duration {
    later.duration_since(earlier).unwrap_or(Duration::ZERO)
}

impl StepEngine for LocalEngine {
    fn current_step(&self) -> Step {
        self.current
    }

    fn step(
        &mut self,
        plan: &SegmentPlan,
        callback: &mut CallbackController,
    ) -> Result<StopReason, EngineError> {
        let start = self.current;
        let end = start
            .checked_add(plan.steps)
            .ok_or(EngineError::ClockOverflow {
                current: start,
                requested: plan.steps,
            })?;
        let started_at = self.clock.now();
        let mut last_status = started_at;
        let mut reason = StopReason::Completed;

        while self.current < end {
            let now = self.clock.now();
            let stats = self.stats(start, started_at, now);

            if self.current.is_multiple_of(plan.limit_multiple.get()) {
                if let Some(cause) = self.wall_clock_stop(plan, &stats, now) {
                    reason = StopReason::WallClockExceeded(cause);
                    break;
                }
            }

            if !self.quiet && elapsed_between(last_status, now) >= self.config.status_period {
                self.emit_status(&stats, end);
                last_status = now;
            }

            if callback.poll(self.current).is_break() {
                tracing::debug!(
                    "end of run requested by callback at step {} / {}",
                    self.current,
                    end
                );
                reason = StopReason::CallbackAbort;
                break;
            }

            let step = self.current;
            self.stepper
                .advance(step)
                .map_err(|reason| EngineError::StepFailed { step, reason })?;
            self.current = step.next();
        }

        let stats = self.stats(start, started_at, self.clock.now());
        if !self.quiet {
            self.emit_status(&stats, end);
        }
        callback.finish(self.current);

        if self.profile {
            tracing::info!(
                steps = stats.steps(),
                elapsed_s = stats.elapsed.as_secs_f64(),
                tps = stats.steps_per_second(),
                "profile: {} steps in {:.3}s ({:.4} steps/s)",
                stats.steps(),
                stats.elapsed.as_secs_f64(),
                stats.steps_per_second(),
            );
        }
        self.last_run = Some(stats);
        Ok(reason)
    }

    fn set_autotuner_params(&mut self, enabled: bool, period: u64) {
        self.autotuner = AutotunerConfig { enabled, period };
        tracing::debug!(enabled, period, "autotuner parameters set");
    }

    fn enable_profiler(&mut self, enabled: bool) {
        self.profile = enabled;
    }

    fn enable_quiet_run(&mut self, quiet: bool) {
        self.quiet = quiet;
    }
}

impl std::fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEngine")
            .field("current", &self.current)
            .field("config", &self.config)
            .field("autotuner", &self.autotuner)
            .field("profile", &self.profile)
            .field("quiet", &self.quiet)
            .finish()
    }
}
