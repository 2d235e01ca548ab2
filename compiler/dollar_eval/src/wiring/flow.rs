//! Data-flow operators: `|`, `<*`, `=>`, `>>` and `<<`.

use std::sync::Arc;

use dollar_ir::{OpKind, OpToken};
use dollar_value::error::type_mismatch;
use dollar_value::{EvalResult, Pipe, Value};

use super::{validate, with_it, OperatorTableError, Wiring};
use crate::context::ScopeSnapshot;
use crate::force::{force, force_deep};
use crate::runtime::Runtime;
use crate::subscription::subscribe;

impl Wiring {
    /// `lhs | rhs`: evaluate `rhs` with `it` bound to the forced `lhs`.
    pub(super) fn pipe(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let runtime = self.runtime().clone();
        let node = self
            .node(token.op.name, &token.source)
            .inputs(token.operands.clone())
            .pure(token.op.pure)
            .reactive(token.op.reactive)
            .build(move |inputs| {
                let config = runtime.config();
                let item = force(&inputs[0], config.assignment_fix_depth, config.parallel)?;
                with_it("pipe", &item, || {
                    force(&inputs[1], config.assignment_fix_depth, config.parallel)
                })
            });
        self.finish(&token, &node)
    }

    /// `source <* expr`: evaluate `expr` for every item `source` delivers.
    ///
    /// Resources are subscribed to (variables holding one are resolved
    /// first); nodes are listened to; anything else is delivered once.
    /// Evaluates to the subscription id.
    pub(super) fn subscribe(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let runtime = self.runtime().clone();
        let node = self
            .node(token.op.name, &token.source)
            .inputs(token.operands.clone())
            .scope_closure(true)
            .pure(false)
            .build(move |inputs| {
                let resolved = inputs[0].fix(1)?;
                let source = if resolved.as_resource().is_some() {
                    resolved
                } else {
                    inputs[0].clone()
                };
                deliver(&runtime, "subscribe", &source, &inputs[1])
            });
        self.finish(&token, &node)
    }

    /// `source => expr`: evaluate `expr` whenever `source` notifies.
    pub(super) fn listen(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let runtime = self.runtime().clone();
        let node = self
            .node(token.op.name, &token.source)
            .inputs(token.operands.clone())
            .scope_closure(true)
            .pure(false)
            .build(move |inputs| deliver(&runtime, "listen", &inputs[0], &inputs[1]));
        self.finish(&token, &node)
    }

    /// `value >> resource`: non-blocking write.
    pub(super) fn publish(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let parallel = self.runtime().config().parallel;
        let node = self
            .node(token.op.name, &token.source)
            .inputs(token.operands.clone())
            .pure(false)
            .build(move |inputs| {
                let value = force_deep(&inputs[0], parallel)?;
                write_to(&inputs[1], value, false, "publish")
            });
        self.finish(&token, &node)
    }

    /// `resource << value`: blocking write.
    pub(super) fn write(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let parallel = self.runtime().config().parallel;
        let node = self
            .node(token.op.name, &token.source)
            .inputs(token.operands.clone())
            .pure(false)
            .build(move |inputs| {
                let value = force_deep(&inputs[1], parallel)?;
                write_to(&inputs[0], value, true, "write")
            });
        self.finish(&token, &node)
    }
}

/// Subscribe `expr` to `source` and keep the subscription on the runtime.
fn deliver(runtime: &Runtime, kind: &'static str, source: &Value, expr: &Value) -> EvalResult {
    let snapshot = ScopeSnapshot::capture();
    let expr = expr.clone();
    let config = runtime.config().clone();
    let callback: Pipe = Arc::new(move |item: &Value| {
        let _attached = snapshot.attach();
        with_it(kind, item, || {
            force(&expr, config.assignment_fix_depth, config.parallel)
        })
    });
    let subscription = subscribe(source, callback)?;
    let id = subscription.id().to_string();
    runtime.track_subscription(id.clone(), subscription);
    Ok(Value::string(id))
}

fn write_to(target: &Value, value: Value, blocking: bool, op: &str) -> EvalResult {
    let target = target.fix(1)?;
    match target.untagged() {
        Value::Resource(handle) => Ok(handle.backend().write(value, blocking, false)),
        other => Err(type_mismatch(op, value.type_name(), other.type_name())),
    }
}
