//! Test utilities and recording fakes for Stride development.
//!
//! Provides recording implementations of the core traits (see
//! [`fixtures`]), a shared [`Journal`] they write to, a manually driven
//! [`ManualClock`], and [`capture_logs`] for asserting on `tracing`
//! output.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    ClockedStepper, NoopStepper, RecordingEngine, RecordingIntegrator, RecordingLogger,
    RecordingNeighborList,
};

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use stride_core::{SegmentPlan, WallClock};
use tracing_subscriber::fmt::MakeWriter;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Journal ─────────────────────────────────────────────────────

/// One observable call made on a recording fake.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    UpdateForces,
    UpdateMethods,
    UpdateThermos,
    UpdateQuantities(String),
    UpdateRcut(String),
    UpdateExclusions(String),
    Autotuner { enabled: bool, period: u64 },
    Profiler(bool),
    QuietRun(bool),
    /// A stepping segment was requested with this plan.
    Step(SegmentPlan),
}

/// Shared, ordered log of [`Event`]s.
///
/// Clones share the same storage, so one journal handed to several fakes
/// records their calls in global order.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Event) {
        lock(&self.events).push(event);
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

// ── ManualClock ─────────────────────────────────────────────────

/// Wall clock that only moves when told to. Clones share state.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    pub fn set(&self, to: SystemTime) {
        *lock(&self.now) = to;
    }

    pub fn now(&self) -> SystemTime {
        *lock(&self.now)
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> SystemTime {
        ManualClock::now(self)
    }
}

// ── Log capture ─────────────────────────────────────────────────

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return its result together
/// with everything logged at any level, without ANSI colors.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&lock(&buffer.0)).into_owned();
    (result, text)
}
