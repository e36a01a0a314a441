//! Run driver and reference stepping engine for Stride.
//!
//! Provides [`RunDriver`](driver::RunDriver), which executes run
//! segments against an explicit [`SimContext`](context::SimContext):
//! readiness check, periodic-task priming, wall-clock budget computation,
//! and delegation to the context's engine with the callback wired in.
//! [`LocalEngine`](local::LocalEngine) is an in-process engine that
//! implements the stepping contract on top of a per-step
//! [`Stepper`](stride_core::Stepper).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod budget;
pub mod config;
pub mod context;
pub mod driver;
pub mod local;
pub mod metrics;
pub mod priming;

pub use budget::{Budget, WallClockBudget};
pub use config::{AutotunerConfig, ConfigError, DriverConfig, EngineConfig, WALLTIME_STOP_ENV};
pub use context::{ReadyContext, SimContext};
pub use driver::{RunDriver, RunOptions};
pub use local::LocalEngine;
pub use metrics::RunStats;
pub use priming::{prime, prime_integrator, prime_tasks, PrimeReport};
