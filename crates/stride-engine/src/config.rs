//! Driver and engine configuration, validation, and error types.
//!
//! [`DriverConfig`] carries the process-wide settings every run segment
//! shares: autotuner parameters and the optional wall-clock deadline.
//! The deadline is read once (usually from [`WALLTIME_STOP_ENV`]) and
//! threaded through construction instead of living in a global.

use std::error::Error;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Environment variable holding the wall-clock deadline as a unix epoch
/// timestamp in seconds.
///
/// A job script that should run 12 hours and leave 10 minutes for
/// cleanup sets it to `$(( $(date +%s) + 12 * 3600 - 10 * 60 ))`.
pub const WALLTIME_STOP_ENV: &str = "STRIDE_WALLTIME_STOP";

// ── AutotunerConfig ────────────────────────────────────────────────

/// Kernel autotuner settings forwarded to the engine before each segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutotunerConfig {
    /// Whether autotuning is enabled. Default: `true`.
    pub enabled: bool,
    /// Steps between re-tuning passes. Default: 100000. Minimum: 1.
    pub period: u64,
}

impl Default for AutotunerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: 100_000,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building or validating configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The walltime-stop value is not a unix timestamp in seconds.
    InvalidWalltimeStop {
        /// The rejected value.
        value: String,
    },
    /// Autotuner period is zero.
    ZeroAutotunerPeriod,
    /// Engine status period is zero.
    ZeroStatusPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWalltimeStop { value } => {
                write!(
                    f,
                    "{WALLTIME_STOP_ENV} must be a unix timestamp in seconds, got {value:?}"
                )
            }
            Self::ZeroAutotunerPeriod => write!(f, "autotuner period must be at least 1"),
            Self::ZeroStatusPeriod => write!(f, "status period must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

// ── DriverConfig ───────────────────────────────────────────────────

/// Process-wide settings for a [`RunDriver`](crate::driver::RunDriver).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Autotuner parameters applied before every segment.
    pub autotuner: AutotunerConfig,
    /// Absolute time by which every run must have stopped. `None` means
    /// no deadline.
    pub walltime_stop: Option<SystemTime>,
}

impl DriverConfig {
    /// Default configuration with the deadline read from
    /// [`WALLTIME_STOP_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = std::env::var(WALLTIME_STOP_ENV).ok();
        Self::from_env_value(value.as_deref())
    }

    /// Default configuration with the deadline taken from a raw
    /// environment value. `None` or a blank value means no deadline.
    pub fn from_env_value(value: Option<&str>) -> Result<Self, ConfigError> {
        let walltime_stop = match value.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_walltime_stop(raw)?),
        };
        Ok(Self {
            walltime_stop,
            ..Self::default()
        })
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autotuner.period == 0 {
            return Err(ConfigError::ZeroAutotunerPeriod);
        }
        Ok(())
    }
}

/// Parse a unix epoch timestamp in whole seconds.
pub fn parse_walltime_stop(raw: &str) -> Result<SystemTime, ConfigError> {
    let invalid = || ConfigError::InvalidWalltimeStop {
        value: raw.to_string(),
    };
    let secs: u64 = raw.trim().parse().map_err(|_| invalid())?;
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .ok_or_else(invalid)
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Settings for [`LocalEngine`](crate::local::LocalEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Wall-clock time between status lines during a non-quiet run.
    /// Default: 10 s.
    pub status_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_period: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status_period.is_zero() {
            return Err(ConfigError::ZeroStatusPeriod);
        }
        Ok(())
    }
}
