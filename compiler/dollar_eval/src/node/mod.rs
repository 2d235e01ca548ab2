//! Lazy computation nodes.
//!
//! A [`Node`] pairs a deferred function with the inputs it was built from.
//! Forcing runs the function (inside the node's captured scopes when it is
//! a scope closure, inside a fresh child scope when it asks for one) and
//! then forces whatever it returned to the same depth.
//!
//! Nodes also form the reactive graph: listening on a node wires it to its
//! upstream (the nodes among its inputs, or the scope variable it reads),
//! so a change anywhere upstream re-notifies every listener downstream.

mod listeners;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bitflags::bitflags;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use dollar_ir::{SourceSegment, VarKey};
use dollar_stack::ensure_sufficient_stack;
use dollar_value::error::constraint_violation;
use dollar_value::{EvalError, EvalResult, Metadata, NodeId, NodeRef, Pipe, Reactive, Value};

use crate::context::{self, ScopeSnapshot};
use crate::force::force;
use crate::prediction::PredictionKey;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;

use listeners::Listeners;

static NEXT_NODE: AtomicU64 = AtomicU64::new(1);

/// The deferred function of a node; receives the node's inputs.
pub type NodeFn = Arc<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// No side effects; safe to re-run.
        const PURE = 1;
        /// Runs in a fresh child of the active scope.
        const NEW_SCOPE = 1 << 1;
        /// Runs inside the scopes captured when it was built.
        const SCOPE_CLOSURE = 1 << 2;
        /// Deferred until forced (as opposed to evaluated at build time).
        const REACTIVE = 1 << 3;
    }
}

/// Where change notifications for a node come from.
#[derive(Clone)]
enum Upstream {
    /// Any node among the inputs.
    Inputs,
    /// A scope variable; `hint` is the scope active when the node was built.
    Variable { key: VarKey, hint: Option<ScopeRef> },
}

pub struct Node {
    id: NodeId,
    me: Weak<Node>,
    operation: Arc<str>,
    source: SourceSegment,
    inputs: Vec<Value>,
    body: NodeFn,
    flags: NodeFlags,
    captured: Option<ScopeSnapshot>,
    upstream: Upstream,
    wired: AtomicBool,
    listeners: Listeners,
    fingerprint: Mutex<Option<String>>,
    meta: RwLock<Metadata>,
    runtime: Runtime,
}

impl Node {
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// This node as a value.
    pub fn as_value(&self) -> Value {
        match self.me.upgrade() {
            Some(node) => Value::node(node),
            None => Value::Void,
        }
    }

    /// The scope a variable node reads from, if it can find one.
    fn scope_hint(&self) -> Option<ScopeRef> {
        match &self.upstream {
            Upstream::Variable { hint, .. } => hint.clone(),
            Upstream::Inputs => None,
        }
    }

    /// Run the deferred function once, without forcing its result.
    pub fn execute(&self) -> EvalResult {
        let limit = self.runtime.config().max_recursion_depth;
        let _frame =
            context::enter_node(self.id, limit).map_err(|err| err.with_source(&self.source))?;

        let result = {
            let _attached = self.captured.as_ref().map(ScopeSnapshot::attach);
            let _hinted = match (context::current_scope(), self.scope_hint()) {
                (None, Some(hint)) => Some(context::push_scope(hint)),
                _ => None,
            };
            let _fresh = if self.flags.contains(NodeFlags::NEW_SCOPE) {
                let scope = match context::current_scope() {
                    Some(parent) => parent.child(self.operation.as_ref()),
                    None => ScopeRef::root(self.operation.as_ref()),
                };
                Some(context::push_scope(scope))
            } else {
                None
            };
            trace!(node = %self.id, op = %self.operation, depth = context::call_depth(), "execute");

            match ensure_sufficient_stack(|| (self.body)(&self.inputs)) {
                Ok(value) => Ok(value),
                Err(err) => self.recover(err),
            }
        };

        if let Some(corrupted) = context::take_corruption() {
            return Err(corrupted.with_source(&self.source));
        }
        if let Ok(value) = &result {
            if let Some(ty) = value.type_of() {
                let key = PredictionKey::new(
                    Arc::clone(&self.operation),
                    self.source.clone(),
                    &self.inputs,
                );
                self.runtime.learner().record(self.id, key, ty);
            }
        }
        result
    }

    /// Hand a non-fatal failure to the nearest scope error handler.
    fn recover(&self, err: EvalError) -> EvalResult {
        let err = err.with_source(&self.source);
        if err.is_fatal() {
            return Err(err);
        }
        match context::current_scope() {
            Some(scope) => scope.handle_error(err),
            None => Err(err),
        }
    }

    /// Relays upstream notifications into this node.
    fn relay(&self) -> Pipe {
        let me = self.me.clone();
        Arc::new(move |_: &Value| match me.upgrade() {
            Some(node) => node.notify(),
            None => Ok(Value::Void),
        })
    }

    fn relay_key(&self) -> String {
        format!("relay-{}", self.id.0)
    }

    fn wire_upstream(&self) -> Result<(), EvalError> {
        if self.wired.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match &self.upstream {
            Upstream::Inputs => {
                for input in &self.inputs {
                    if let Value::Node(upstream) = input.untagged() {
                        upstream.listen(self.relay(), Some(self.relay_key()))?;
                    }
                }
            }
            Upstream::Variable { key, hint } => {
                if let Some(scope) = context::current_scope().or_else(|| hint.clone()) {
                    scope.listen(key, self.relay_key(), self.relay());
                }
            }
        }
        Ok(())
    }
}

impl Reactive for Node {
    fn id(&self) -> NodeId {
        self.id
    }

    fn operation(&self) -> &str {
        &self.operation
    }

    fn source(&self) -> &SourceSegment {
        &self.source
    }

    fn fix(&self, depth: usize, parallel: bool) -> EvalResult {
        if depth == 0 {
            return Ok(self.as_value());
        }
        let value = self.execute()?;
        force(&value, depth, parallel)
    }

    fn listen(&self, pipe: Pipe, key: Option<String>) -> EvalResult {
        self.wire_upstream()?;
        let key = key.unwrap_or_else(|| format!("{}-{}", self.id.0, self.listeners.next_seq()));
        debug!(node = %self.id, %key, "listen");
        self.listeners.register(key.clone(), pipe);
        Ok(Value::string(key))
    }

    fn unlisten(&self, key: &str) -> Value {
        if self.listeners.remove(key) {
            debug!(node = %self.id, %key, "unlisten");
        }
        Value::Void
    }

    fn notify(&self) -> EvalResult {
        let Some(_notifying) = context::enter_notify(self.id) else {
            trace!(node = %self.id, "re-entrant notify skipped");
            return Ok(Value::Void);
        };
        let value = self.fix(1, self.runtime.config().parallel)?;
        let pipes = self.listeners.ordered();
        debug!(node = %self.id, op = %self.operation, listeners = pipes.len(), "notify");
        for pipe in pipes {
            pipe(&value)?;
        }
        Ok(value)
    }

    fn constrain(&self, fingerprint: &str) -> EvalResult {
        let mut bound = self.fingerprint.lock();
        match bound.as_deref() {
            None => {
                *bound = Some(fingerprint.to_string());
                Ok(Value::Void)
            }
            Some(existing) if existing == fingerprint => Ok(Value::Void),
            Some(_) => Err(constraint_violation(&self.operation, fingerprint)),
        }
    }

    fn metadata(&self) -> Metadata {
        self.meta.read().clone()
    }

    fn set_metadata(&self, key: &str, value: &str) {
        self.meta.write().set(key, value);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{}>", self.operation, self.id)
    }
}

/// Builder for [`Node`]s.
///
/// Defaults to a reactive, impure node that runs in the caller's scope and
/// relays notifications from its node inputs.
pub struct NodeBuilder {
    runtime: Runtime,
    operation: Arc<str>,
    source: SourceSegment,
    inputs: Vec<Value>,
    flags: NodeFlags,
    upstream: Upstream,
}

impl NodeBuilder {
    pub fn new(runtime: &Runtime, operation: &str, source: SourceSegment) -> Self {
        NodeBuilder {
            runtime: runtime.clone(),
            operation: Arc::from(operation),
            source,
            inputs: Vec::new(),
            flags: NodeFlags::REACTIVE,
            upstream: Upstream::Inputs,
        }
    }

    #[must_use]
    pub fn inputs(mut self, inputs: Vec<Value>) -> Self {
        self.inputs = inputs;
        self
    }

    #[must_use]
    pub fn pure(mut self, pure: bool) -> Self {
        self.flags.set(NodeFlags::PURE, pure);
        self
    }

    #[must_use]
    pub fn new_scope(mut self, new_scope: bool) -> Self {
        self.flags.set(NodeFlags::NEW_SCOPE, new_scope);
        self
    }

    /// Capture the current scope stack and run inside it.
    #[must_use]
    pub fn scope_closure(mut self, closure: bool) -> Self {
        self.flags.set(NodeFlags::SCOPE_CLOSURE, closure);
        self
    }

    #[must_use]
    pub fn reactive(mut self, reactive: bool) -> Self {
        self.flags.set(NodeFlags::REACTIVE, reactive);
        self
    }

    /// Take notifications from the scope variable `key` instead of inputs.
    #[must_use]
    pub fn variable(mut self, key: VarKey) -> Self {
        self.upstream = Upstream::Variable {
            key,
            hint: context::current_scope(),
        };
        self
    }

    pub fn build(self, body: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static) -> Arc<Node> {
        let captured = self
            .flags
            .contains(NodeFlags::SCOPE_CLOSURE)
            .then(ScopeSnapshot::capture);
        let body: NodeFn = Arc::new(body);
        Arc::new_cyclic(|me| Node {
            id: NodeId(NEXT_NODE.fetch_add(1, Ordering::Relaxed)),
            me: me.clone(),
            operation: self.operation,
            source: self.source,
            inputs: self.inputs,
            body,
            flags: self.flags,
            captured,
            upstream: self.upstream,
            wired: AtomicBool::new(false),
            listeners: Listeners::default(),
            fingerprint: Mutex::new(None),
            meta: RwLock::new(Metadata::new()),
            runtime: self.runtime,
        })
    }

    /// Build and wrap as a value.
    pub fn build_value(
        self,
        body: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Value {
        let node: NodeRef = self.build(body);
        Value::node(node)
    }
}
