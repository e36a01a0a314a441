//! Per-segment refresh of the periodic tasks.
//!
//! Priming runs once at the start of every run segment, before any
//! stepping, in two phases:
//!
//! 1. [`prime_integrator()`]: integrator forces, methods, thermos
//!    (warning if no integrator);
//! 2. [`prime_tasks()`]: every logger's tracked quantities, then every
//!    neighbor list's cutoff and default exclusions.
//!
//! The driver sets autotuner parameters between the two phases.
//! [`prime()`] runs both back to back. Loggers may read
//! integrator-derived quantities, so the integrator is refreshed first.
//! The first failing call aborts the segment.

use stride_core::{RunError, TaskError};

use crate::context::ReadyContext;

/// What a [`prime()`] call refreshed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimeReport {
    /// Whether an integrator was attached and refreshed.
    pub integrator: bool,
    /// Number of loggers refreshed.
    pub loggers: usize,
    /// Number of neighbor lists refreshed.
    pub neighbor_lists: usize,
}

fn priming_error(task: String, action: &'static str) -> impl FnOnce(TaskError) -> RunError {
    move |reason| RunError::Priming {
        task,
        action,
        reason,
    }
}

/// Refresh integrator, loggers, and neighbor lists, in that order.
///
/// # Errors
///
/// [`RunError::Priming`] naming the first task and call that failed.
/// Tasks after it are not refreshed.
pub fn prime(ready: &mut ReadyContext<'_>) -> Result<PrimeReport, RunError> {
    let integrator = prime_integrator(ready)?;
    prime_tasks(ready, integrator)
}

/// Refresh the integrator's forces, methods, and thermos.
///
/// Returns whether an integrator was attached; a missing one is only
/// warned about.
///
/// # Errors
///
/// [`RunError::Priming`] naming the integrator call that failed.
pub fn prime_integrator(ready: &mut ReadyContext<'_>) -> Result<bool, RunError> {
    let Some(integrator) = ready.integrator.as_deref_mut() else {
        tracing::warn!("starting a run without an integrator set");
        return Ok(false);
    };
    let task = format!("integrator '{}'", integrator.name());
    integrator
        .update_forces()
        .map_err(priming_error(task.clone(), "update_forces"))?;
    integrator
        .update_methods()
        .map_err(priming_error(task.clone(), "update_methods"))?;
    integrator
        .update_thermos()
        .map_err(priming_error(task, "update_thermos"))?;
    Ok(true)
}

/// Refresh every logger, then every neighbor list.
///
/// `integrator` records whether [`prime_integrator()`] refreshed one, for
/// the returned report.
///
/// # Errors
///
/// [`RunError::Priming`] naming the first task and call that failed.
pub fn prime_tasks(
    ready: &mut ReadyContext<'_>,
    integrator: bool,
) -> Result<PrimeReport, RunError> {
    let mut report = PrimeReport {
        integrator,
        ..PrimeReport::default()
    };

    for (name, logger) in ready.loggers.iter_mut() {
        logger
            .update_quantities()
            .map_err(priming_error(format!("logger '{name}'"), "update_quantities"))?;
        report.loggers += 1;
    }

    for (name, nlist) in ready.neighbor_lists.iter_mut() {
        let task = format!("neighbor list '{name}'");
        nlist
            .update_rcut()
            .map_err(priming_error(task.clone(), "update_rcut"))?;
        nlist
            .update_exclusions_defaults()
            .map_err(priming_error(task, "update_exclusions_defaults"))?;
        report.neighbor_lists += 1;
    }

    tracing::debug!(
        integrator = report.integrator,
        loggers = report.loggers,
        neighbor_lists = report.neighbor_lists,
        "periodic tasks primed"
    );
    Ok(report)
}
