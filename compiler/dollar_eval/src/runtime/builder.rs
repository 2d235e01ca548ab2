//! `RuntimeBuilder` for creating runtimes with non-default configuration.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use super::{Runtime, RuntimeInner, DEFAULT_BUILTINS};
use crate::eval_mode::{EvalMode, RuntimeConfig};
use crate::prediction::TypeLearner;
use crate::shared::SharedMutableRegistry;

/// Builder for [`Runtime`].
///
/// Starts from the defaults of an [`EvalMode`]; every setter overrides one
/// field of the resulting [`RuntimeConfig`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    builtins: Vec<String>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        RuntimeBuilder::for_mode(EvalMode::default())
    }

    pub fn for_mode(mode: EvalMode) -> Self {
        RuntimeBuilder {
            config: RuntimeConfig::for_mode(mode),
            builtins: DEFAULT_BUILTINS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.config.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn assignment_fix_depth(mut self, depth: usize) -> Self {
        self.config.assignment_fix_depth = depth;
        self
    }

    #[must_use]
    pub fn type_warning_threshold(mut self, threshold: f64) -> Self {
        self.config.type_warning_threshold = threshold;
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn blocking_timeout(mut self, timeout: Duration) -> Self {
        self.config.blocking_timeout = timeout;
        self
    }

    /// Reserve another name.
    #[must_use]
    pub fn builtin(mut self, name: impl Into<String>) -> Self {
        self.builtins.push(name.into());
        self
    }

    pub fn build(self) -> Runtime {
        Runtime(Arc::new(RuntimeInner {
            config: self.config,
            learner: TypeLearner::new(),
            builtins: self.builtins.into_iter().collect(),
            exports: SharedMutableRegistry::default(),
            subscriptions: DashMap::new(),
        }))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        RuntimeBuilder::new()
    }
}
