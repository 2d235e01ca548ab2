//! Evaluation modes and runtime configuration.
//!
//! [`EvalMode`] picks a policy set; [`RuntimeConfig`] carries the tunables
//! every node and wiring builder reads. Modes only seed defaults, every
//! field can still be overridden through the runtime builder.

use std::time::Duration;

/// Evaluation mode: determines default runtime policy via match dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Standard script execution.
    #[default]
    Interpret,
    /// Test execution: deterministic sequential forcing, fast resource polling.
    Test,
}

impl EvalMode {
    /// Maximum nested node executions on one thread.
    #[inline]
    pub fn max_recursion_depth(self) -> usize {
        match self {
            Self::Interpret | Self::Test => 100,
        }
    }

    /// Whether containers are forced across the worker pool by default.
    #[inline]
    pub fn parallel_forcing(self) -> bool {
        match self {
            Self::Interpret | Self::Test => false,
        }
    }

    /// How often resource subscriptions poll their backend.
    #[inline]
    pub fn poll_interval(self) -> Duration {
        match self {
            Self::Interpret => Duration::from_millis(100),
            Self::Test => Duration::from_millis(5),
        }
    }

    /// How long a blocking resource read or write waits before giving up.
    #[inline]
    pub fn blocking_timeout(self) -> Duration {
        match self {
            Self::Interpret => Duration::from_secs(10),
            Self::Test => Duration::from_millis(200),
        }
    }
}

/// Tunables for one runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub mode: EvalMode,
    /// Node recursion limit; exceeding it raises `RECURSION_LIMIT_EXCEEDED`.
    pub max_recursion_depth: usize,
    /// Depth an assignment forces its right-hand side to before binding.
    pub assignment_fix_depth: usize,
    /// Predicted-type probability below which an assignment logs a warning.
    pub type_warning_threshold: f64,
    /// Force list and map children on the rayon pool.
    pub parallel: bool,
    /// Stop a script at its first unhandled error.
    pub fail_fast: bool,
    pub poll_interval: Duration,
    pub blocking_timeout: Duration,
}

impl RuntimeConfig {
    pub fn for_mode(mode: EvalMode) -> Self {
        RuntimeConfig {
            mode,
            max_recursion_depth: mode.max_recursion_depth(),
            assignment_fix_depth: 2,
            type_warning_threshold: 0.5,
            parallel: mode.parallel_forcing(),
            fail_fast: true,
            poll_interval: mode.poll_interval(),
            blocking_timeout: mode.blocking_timeout(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig::for_mode(EvalMode::default())
    }
}
