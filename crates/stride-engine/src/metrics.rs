//! Per-segment performance metrics.
//!
//! [`RunStats`] captures the step range and wall-clock time of one run
//! segment, feeding status lines and the profile summary.

use std::time::Duration;

use stride_core::Step;

/// Timing data for a single run segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Clock value when the segment started.
    pub start_step: Step,
    /// Clock value when the segment ended.
    pub end_step: Step,
    /// Wall-clock time spent in the stepping loop.
    pub elapsed: Duration,
}

impl RunStats {
    /// Steps executed in the segment.
    pub fn steps(&self) -> u64 {
        self.end_step.steps_since(self.start_step)
    }

    /// Average throughput. Zero when no time has elapsed.
    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps() as f64 / secs
        } else {
            0.0
        }
    }

    /// Estimated time to reach `target` at the current throughput.
    /// `None` before any throughput has been measured.
    pub fn eta(&self, target: Step) -> Option<Duration> {
        let tps = self.steps_per_second();
        if tps > 0.0 {
            Duration::try_from_secs_f64(target.steps_since(self.end_step) as f64 / tps).ok()
        } else {
            None
        }
    }
}
