//! Script execution.
//!
//! The front end builds one node per statement (inside [`ScriptRunner::enter`]
//! so scope closures capture the script's root scope), then hands the list
//! to [`ScriptRunner::run`].

use std::sync::Arc;

use tracing::{debug, error};

use dollar_ir::SourceText;
use dollar_value::{EvalError, Value};

use crate::context;
use crate::force::force;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::wiring::Wiring;

pub struct ScriptRunner {
    runtime: Runtime,
    wiring: Wiring,
    root: ScopeRef,
}

impl ScriptRunner {
    pub fn new(runtime: &Runtime) -> Self {
        ScriptRunner {
            runtime: runtime.clone(),
            wiring: Wiring::new(runtime),
            root: ScopeRef::root("script"),
        }
    }

    /// A runner whose root scope points at `source`.
    pub fn with_source(runtime: &Runtime, source: Arc<SourceText>) -> Self {
        let name = source.file().unwrap_or("script").to_string();
        ScriptRunner {
            runtime: runtime.clone(),
            wiring: Wiring::new(runtime),
            root: ScopeRef::root(name).with_source(source),
        }
    }

    pub fn root(&self) -> &ScopeRef {
        &self.root
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Run `f` with the root scope active.
    pub fn enter<R>(&self, f: impl FnOnce(&Wiring) -> R) -> R {
        let _guard = context::push_scope(self.root.clone());
        f(&self.wiring)
    }

    /// Force each statement in order and return the last value.
    ///
    /// An error (raised, or left as a sticky error value) that no scope
    /// handler absorbed stops the script when `fail_fast` is set or the
    /// error is fatal. Otherwise it is logged, the script carries on, and
    /// the first failure comes back at the end with the rest as causes.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = statements.len()))]
    pub fn run(&self, statements: &[Value]) -> Result<Value, EvalError> {
        let _guard = context::push_scope(self.root.clone());
        let config = self.runtime.config();
        let mut last = Value::Void;
        let mut failures: Vec<EvalError> = Vec::new();

        for (index, statement) in statements.iter().enumerate() {
            let outcome = force(statement, 1, config.parallel).and_then(|value| {
                match value.as_error() {
                    Some(err) => Err(err.clone()),
                    None => Ok(value),
                }
            });
            match outcome {
                Ok(value) => {
                    debug!(statement = index, %value, "statement done");
                    last = value;
                }
                Err(err) => {
                    error!(statement = index, "unhandled error: {}", err.report());
                    if config.fail_fast || err.is_fatal() {
                        return Err(err);
                    }
                    failures.push(err);
                }
            }
        }

        let mut failures = failures.into_iter();
        match failures.next() {
            Some(first) => Err(failures.fold(first, EvalError::with_cause)),
            None => Ok(last),
        }
    }
}
