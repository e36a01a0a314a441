//! Stride: run control for long-lived, stateful simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Stride sub-crates. Adding `stride` as a single dependency is enough
//! for most users.
//!
//! # Quick start
//!
//! ```rust
//! use stride::prelude::*;
//!
//! // Per-step work; a real engine would integrate equations of motion here.
//! let stepper = |_step: Step| -> Result<(), TaskError> { Ok(()) };
//! let engine = LocalEngine::new(EngineConfig::default(), Box::new(stepper)).unwrap();
//!
//! let driver = RunDriver::new(DriverConfig::default()).unwrap();
//! let mut ctx = SimContext::with_engine(Box::new(engine));
//!
//! // Steps accumulate across calls.
//! driver.run(&mut ctx, 1_000, RunOptions::new().quiet(true)).unwrap();
//! driver.run(&mut ctx, 2_000, RunOptions::new().quiet(true)).unwrap();
//! assert_eq!(driver.get_step(&ctx).unwrap(), Step(3_000));
//!
//! // Already past the target: nothing runs.
//! let outcome = driver
//!     .run_upto(&mut ctx, Step(2_500), RunOptions::new().quiet(true))
//!     .unwrap();
//! assert!(matches!(outcome, RunOutcome::Skipped { .. }));
//!
//! // A negative callback return ends the run early.
//! let outcome = driver
//!     .run(
//!         &mut ctx,
//!         100,
//!         RunOptions::new()
//!             .quiet(true)
//!             .callback(10, |step| Some(if step == Step(3_050) { -1 } else { 0 })),
//!     )
//!     .unwrap();
//! assert_eq!(outcome, RunOutcome::CallbackAbort { step: Step(3_050) });
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stride-core` | `Step`, segment plans, outcomes, errors, engine traits |
//! | [`engine`] | `stride-engine` | Run driver, context, budgets, configuration, `LocalEngine` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`stride-core`).
///
/// Contains the [`types::Step`] counter, [`types::RunOutcome`], the
/// error types, and the capability traits an engine implements
/// ([`types::StepEngine`], [`types::Integrator`], [`types::Logger`],
/// [`types::NeighborList`]).
pub use stride_core as types;

/// Run driver and reference engine (`stride-engine`).
///
/// [`engine::RunDriver`] executes segments against an
/// [`engine::SimContext`]; [`engine::LocalEngine`] is an in-process
/// engine driven by a per-step closure.
pub use stride_engine as engine;

/// Common imports for typical Stride usage.
///
/// ```rust
/// use stride::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use stride_core::{
        Integrator, Logger, NeighborList, RunOutcome, SkipReason, Step, StepCallback,
        StepEngine, Stepper, WallClock, WallClockCause,
    };

    // Errors
    pub use stride_core::{EngineError, RunError, TaskError};

    // Driver
    pub use stride_engine::{
        DriverConfig, EngineConfig, LocalEngine, RunDriver, RunOptions, SimContext,
        WALLTIME_STOP_ENV,
    };

    // Errors
    pub use stride_engine::ConfigError;
}
