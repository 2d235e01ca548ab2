//! Dollar Eval - the reactive evaluation engine.
//!
//! # Architecture
//!
//! - [`ScopeRef`]: shared lexical scopes with constraint-checked bindings
//! - [`context`]: per-thread scope, notify and call stacks with RAII guards
//! - [`Node`]: lazy, listenable computation nodes
//! - [`force`]: sequential and rayon-parallel forcing
//! - [`Wiring`]: builds nodes from operator tokens and assignments
//! - [`Runtime`]: configuration, type learner, exports and subscriptions
//! - [`ScriptRunner`]: runs statement nodes in a root scope
//! - [`QueueResource`]: the in-memory queue backend
//!
//! # Re-exports
//!
//! Value types come from `dollar_value`: `Value`, `EvalError`,
//! `EvalResult`, `ErrorKind`, `Reactive`, `Resource`, `ResourceHandle`.

pub mod context;
mod eval_mode;
mod force;
mod node;
mod operators;
mod prediction;
mod queue;
mod runner;
mod runtime;
mod scope;
mod shared;
mod subscription;
mod wiring;

use std::sync::Once;

pub use dollar_value::{
    ErrorKind, EvalError, EvalResult, Reactive, Resource, ResourceHandle, Signal, Value,
};

pub use context::ScopeSnapshot;
pub use eval_mode::{EvalMode, RuntimeConfig};
pub use force::{force, force_deep};
pub use node::{Node, NodeBuilder, NodeFlags, NodeFn};
pub use operators::{evaluate_binary, evaluate_unary};
pub use prediction::{PredictionKey, TypeLearner, TypePrediction, TypeWarning};
pub use queue::{QueueResource, DEFAULT_CAPACITY};
pub use runner::ScriptRunner;
pub use runtime::{Runtime, RuntimeBuilder, DEFAULT_BUILTINS};
pub use scope::{Binding, BindingFlags, Constraint, ErrorHandler, ScopeRef, SetOptions};
pub use shared::SharedMutableRegistry;
pub use subscription::{subscribe, Subscription};
pub use wiring::{Assignment, Mutability, OperatorTableError, Wiring};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set;
/// enable with `RUST_LOG=dollar_eval=debug` (or `trace` for per-node
/// execution and scope pushes).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
