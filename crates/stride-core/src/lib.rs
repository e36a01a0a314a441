//! Core types and traits for the Stride run-control driver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the driver and every engine implementation:
//! the [`Step`] counter, segment plans and stop reasons, the callback
//! controller, error types, and the capability traits an external
//! simulation engine exposes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod callback;
pub mod error;
pub mod id;
pub mod outcome;
pub mod segment;
pub mod traits;

pub use callback::{CallbackController, StepCallback};
pub use error::{EngineError, RunError, TaskError};
pub use id::Step;
pub use outcome::{RunOutcome, SkipReason};
pub use segment::{SegmentPlan, StopReason, WallClockCause};
pub use traits::{
    Integrator, Logger, NeighborList, StepEngine, Stepper, SystemClock, WallClock,
};
