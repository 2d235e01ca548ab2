//! The runtime: configuration and the state shared by every node it builds.
//!
//! A [`Runtime`] is a cheap handle; nodes keep a clone so they can reach
//! the recursion limit, the type learner and the export table from
//! whichever thread forces them.

mod builder;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use dollar_ir::VarKey;
use dollar_value::{ResourceHandle, ResourceState, Signal, Value};

use crate::eval_mode::RuntimeConfig;
use crate::prediction::TypeLearner;
use crate::shared::SharedMutableRegistry;
use crate::subscription::Subscription;

pub use builder::RuntimeBuilder;

/// Names scripts may not assign to.
pub const DEFAULT_BUILTINS: &[&str] = &[
    "it", "previous", "true", "false", "void", "infinity", "print", "out", "err", "debug",
    "fix", "sleep", "random", "date", "time",
];

struct RuntimeInner {
    config: RuntimeConfig,
    learner: TypeLearner,
    builtins: FxHashSet<String>,
    exports: SharedMutableRegistry<FxHashMap<VarKey, Value>>,
    subscriptions: DashMap<String, Subscription>,
}

#[derive(Clone)]
pub struct Runtime(Arc<RuntimeInner>);

impl Runtime {
    /// A runtime with the default configuration and builtins.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.0.config
    }

    pub fn learner(&self) -> &TypeLearner {
        &self.0.learner
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.0.builtins.contains(name)
    }

    /// Publish a binding outside the script.
    pub fn export(&self, key: VarKey, value: Value) {
        debug!(variable = %key, "export");
        self.0.exports.write().insert(key, value);
    }

    pub fn exported(&self, key: &VarKey) -> Option<Value> {
        self.0.exports.read().get(key).cloned()
    }

    /// All exported bindings, sorted by name.
    pub fn exports(&self) -> Vec<(VarKey, Value)> {
        let mut out: Vec<_> = self
            .0
            .exports
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Keep `subscription` alive under `slot`, cancelling whatever held the
    /// slot before.
    pub(crate) fn track_subscription(&self, slot: String, subscription: Subscription) {
        if let Some(previous) = self.0.subscriptions.insert(slot, subscription) {
            previous.cancel();
        }
    }

    /// Cancel the subscription held under `slot`. Returns whether one was.
    pub fn cancel_subscription(&self, slot: &str) -> bool {
        match self.0.subscriptions.remove(slot) {
            Some((_, subscription)) => {
                subscription.cancel();
                true
            }
            None => false,
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.0.subscriptions.len()
    }

    /// Cancel every tracked subscription, then stop the resources they
    /// were following.
    pub fn shutdown(&self) {
        let slots: Vec<String> = self.0.subscriptions.iter().map(|e| e.key().clone()).collect();
        let mut resources: Vec<ResourceHandle> = Vec::new();
        for slot in slots {
            if let Some((_, subscription)) = self.0.subscriptions.remove(&slot) {
                subscription.cancel();
                if let Some(handle) = subscription.resource() {
                    if !resources.iter().any(|seen| seen.ptr_eq(handle)) {
                        resources.push(handle.clone());
                    }
                }
            }
        }
        for handle in resources {
            if matches!(handle.state(), ResourceState::Running | ResourceState::Paused) {
                let stopped = handle.signal(Signal::Stop);
                if let Some(err) = stopped.as_error() {
                    warn!(resource = handle.name(), %err, "resource did not stop cleanly");
                }
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.0.config)
            .field("builtins", &self.0.builtins.len())
            .field("subscriptions", &self.0.subscriptions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
