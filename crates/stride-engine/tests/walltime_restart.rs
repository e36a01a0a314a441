//! Integration test: wall-clock budgets across job resubmissions.
//!
//! Drives a [`LocalEngine`] on a manual clock (one simulated minute or
//! second per step) through the batch-queue workflow: run toward a target
//! until the walltime deadline forces a stop on a restart-dump multiple,
//! then resume in a "new job" with a fresh deadline and finish the target.

use std::time::{Duration, UNIX_EPOCH};

use stride_core::{RunOutcome, SkipReason, Step, WallClockCause};
use stride_engine::{DriverConfig, EngineConfig, LocalEngine, RunDriver, RunOptions, SimContext};
use stride_test_utils::{capture_logs, ClockedStepper, ManualClock};

const T0: u64 = 1_700_000_000;

fn context_at(clock: &ManualClock, per_step: Duration, start: Step) -> SimContext {
    let stepper = ClockedStepper::new(clock.clone(), per_step);
    let engine = LocalEngine::new(EngineConfig::default(), Box::new(stepper))
        .unwrap()
        .with_clock(Box::new(clock.clone()))
        .with_initial_step(start);
    SimContext::with_engine(Box::new(engine))
}

fn driver_with_deadline(epoch_secs: u64) -> RunDriver {
    let config = DriverConfig::from_env_value(Some(&epoch_secs.to_string())).unwrap();
    RunDriver::new(config).unwrap()
}

// ── Deadline and resume ──────────────────────────────────────────────

#[test]
fn deadline_stop_then_resume_reaches_target() {
    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(T0));
    let mut ctx = context_at(&clock, Duration::from_secs(1), Step::ZERO);

    // First job: 55 s left, restart dumps every 10 steps.
    let first_job = driver_with_deadline(T0 + 55);
    let outcome = first_job
        .run_upto(
            &mut ctx,
            Step(200),
            RunOptions::new().limit_multiple(10).quiet(true),
        )
        .unwrap();
    assert_eq!(
        outcome,
        RunOutcome::WallClockExceeded {
            step: Step(50),
            cause: WallClockCause::Deadline,
        }
    );
    assert!(outcome.is_deadline_stop());
    assert!(clock.now() < UNIX_EPOCH + Duration::from_secs(T0 + 55));

    // Second job: plenty of time.
    let resume_at = first_job.get_step(&ctx).unwrap();
    let second_job = driver_with_deadline(T0 + 10_000);
    let outcome = second_job
        .run_upto(&mut ctx, Step(200), RunOptions::new().limit_multiple(10).quiet(true))
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed { step: Step(200) });
    assert_eq!(resume_at, Step(50));

    // Re-running the same script line is a no-op.
    let outcome = second_job
        .run_upto(&mut ctx, Step(200), RunOptions::new().quiet(true))
        .unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Skipped {
            step: Step(200),
            reason: SkipReason::TargetPassed { target: Step(200) },
        }
    );
}

#[test]
fn deadline_already_passed_runs_nothing() {
    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(T0));
    let mut ctx = context_at(&clock, Duration::from_secs(1), Step(40));
    let driver = driver_with_deadline(T0 - 1);

    let outcome = driver
        .run(&mut ctx, 100, RunOptions::new().quiet(true))
        .unwrap();
    assert!(outcome.is_deadline_stop());
    assert_eq!(driver.get_step(&ctx).unwrap(), Step(40));
}

// ── Per-call hour limit ──────────────────────────────────────────────

#[test]
fn hour_limit_stops_on_multiple_and_is_not_a_deadline() {
    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(T0));
    let mut ctx = context_at(&clock, Duration::from_secs(60), Step::ZERO);
    let driver = RunDriver::new(DriverConfig::default()).unwrap();

    // 15 minutes at one minute per step; checks every 5 steps.
    let (outcome, logs) = capture_logs(|| {
        driver.run(
            &mut ctx,
            1_000,
            RunOptions::new().limit_hours(0.25).limit_multiple(5),
        )
    });
    let outcome = outcome.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::WallClockExceeded {
            step: Step(20),
            cause: WallClockCause::LimitHours,
        }
    );
    assert!(outcome.is_wall_clock_stop());
    assert!(!outcome.is_deadline_stop());
    assert!(logs.contains("ending run at step 20 as 0.25 hours have passed"));
}

#[test]
fn hour_limit_applies_per_call() {
    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(T0));
    let mut ctx = context_at(&clock, Duration::from_secs(60), Step::ZERO);
    let driver = RunDriver::new(DriverConfig::default()).unwrap();
    let opts = || RunOptions::new().limit_hours(0.25).limit_multiple(5).quiet(true);

    let first = driver.run(&mut ctx, 1_000, opts()).unwrap();
    let second = driver.run(&mut ctx, 1_000, opts()).unwrap();
    assert_eq!(first.final_step(), Step(20));
    // The cap restarts with each call.
    assert_eq!(second.final_step(), Step(40));
}

#[test]
fn zero_hour_limit_leaves_clock_untouched() {
    let clock = ManualClock::new(UNIX_EPOCH + Duration::from_secs(T0));
    let mut ctx = context_at(&clock, Duration::from_secs(1), Step(7));
    let driver = driver_with_deadline(T0 + 10_000);

    let outcome = driver
        .run(&mut ctx, 100, RunOptions::new().limit_hours(0.0).quiet(true))
        .unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Skipped {
            step: Step(7),
            reason: SkipReason::ZeroTimeLimit,
        }
    );
    assert_eq!(clock.now(), UNIX_EPOCH + Duration::from_secs(T0));
}
