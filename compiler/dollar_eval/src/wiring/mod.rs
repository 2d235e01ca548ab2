//! Operator wiring: turns operator tokens into nodes.
//!
//! The front end hands over one [`OpToken`] per operator occurrence, with
//! operands already wired (constants, variable references or nodes built
//! by earlier calls). Each builder validates the token against the
//! operator table, builds the node, and either returns it (reactive) or
//! evaluates it on the spot (immediate).
//!
//! Assignments carry more than operands (target, constraint, declared
//! type, mutability) and are built through [`Wiring::assign`].

mod assign;
mod error;
mod flow;

use std::sync::Arc;

use dollar_ir::{OpKind, OpToken, SourceSegment, VarKey};
use dollar_value::error::variable_not_found;
use dollar_value::{EvalError, Reactive, Value};

use crate::context;
use crate::node::{Node, NodeBuilder, NodeFlags};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::runtime::Runtime;
use crate::scope::ScopeRef;

pub use assign::{Assignment, Mutability};
pub use error::OperatorTableError;

/// Builds nodes for one runtime.
#[derive(Clone, Debug)]
pub struct Wiring {
    runtime: Runtime,
}

impl Wiring {
    pub fn new(runtime: &Runtime) -> Self {
        Wiring {
            runtime: runtime.clone(),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn node(&self, operation: &str, source: &SourceSegment) -> NodeBuilder {
        NodeBuilder::new(&self.runtime, operation, source.clone())
    }

    /// A node reading `key` from the scope active where it is forced.
    ///
    /// Listening on it fires whenever the variable is rebound.
    pub fn var_ref(&self, key: impl Into<VarKey>, source: SourceSegment) -> Value {
        let key = key.into();
        let lookup = key.clone();
        self.node("variable", &source)
            .variable(key)
            .pure(true)
            .build_value(move |_| lookup_in_current(&lookup))
    }

    /// Wire any non-assignment token.
    pub fn build(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        match (token.op.kind, token.op.name) {
            (OpKind::Assignment, name) => Err(OperatorTableError::AssignmentToken { op: name }),
            (OpKind::Prefix | OpKind::Postfix, _) => self.unary(token),
            (OpKind::Binary, "pipe") => self.pipe(token),
            (OpKind::Binary, "subscribe") => self.subscribe(token),
            (OpKind::Binary, "listen") => self.listen(token),
            (OpKind::Binary, "publish") => self.publish(token),
            (OpKind::Binary, "write") => self.write(token),
            (OpKind::Binary, _) => self.binary(token),
        }
    }

    pub fn unary(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Prefix, OpKind::Postfix])?;
        let op = token.op;
        let node = self
            .node(op.name, &token.source)
            .inputs(token.operands.clone())
            .pure(op.pure)
            .reactive(op.reactive)
            .build(move |inputs| evaluate_unary(op, &inputs[0]));
        self.finish(&token, &node)
    }

    pub fn binary(&self, token: OpToken<Value>) -> Result<Value, OperatorTableError> {
        validate(&token, &[OpKind::Binary])?;
        let op = token.op;
        let node = self
            .node(op.name, &token.source)
            .inputs(token.operands.clone())
            .pure(op.pure)
            .reactive(op.reactive)
            .build(move |inputs| evaluate_binary(op, &inputs[0], &inputs[1]));
        self.finish(&token, &node)
    }

    /// Check the token asks for what the operator table built, then hand
    /// the node back lazily or evaluate it now.
    ///
    /// Nodes are built from the table entry; a token requesting another
    /// reactivity, or purity from an impure operator, is a table error.
    fn finish(&self, token: &OpToken<Value>, node: &Arc<Node>) -> Result<Value, OperatorTableError> {
        let flags = node.flags();
        let built = flags.contains(NodeFlags::REACTIVE);
        if built != token.reactive {
            return Err(OperatorTableError::ReactivityMismatch {
                op: token.op.name,
                requested: error::mode(token.reactive),
                built: error::mode(built),
            });
        }
        if token.pure && !flags.contains(NodeFlags::PURE) {
            return Err(OperatorTableError::PurityMismatch { op: token.op.name });
        }
        if token.reactive {
            return Ok(node.as_value());
        }
        let parallel = self.runtime.config().parallel;
        Ok(node.fix(1, parallel).unwrap_or_else(EvalError::into_value))
    }
}

/// Validate kind and arity before touching operands.
fn validate(token: &OpToken<Value>, kinds: &[OpKind]) -> Result<(), OperatorTableError> {
    let op = token.op;
    if !kinds.contains(&op.kind) {
        return Err(OperatorTableError::KindMismatch {
            op: op.name,
            expected: kinds[0],
            found: op.kind,
        });
    }
    if !token.has_expected_arity() {
        return Err(OperatorTableError::ArityMismatch {
            op: op.name,
            expected: op.kind.arity(),
            found: token.operands.len(),
        });
    }
    Ok(())
}

fn lookup_in_current(key: &VarKey) -> Result<Value, EvalError> {
    context::current_scope()
        .ok_or_else(|| variable_not_found(key.as_str()))?
        .get(key)
}

/// Run `f` in a fresh child scope with `it` and `1` bound to `item`.
fn with_it<R>(name: &str, item: &Value, f: impl FnOnce() -> R) -> R {
    let scope = match context::current_scope() {
        Some(parent) => parent.child(name),
        None => ScopeRef::root(name),
    };
    scope.set_parameter("it", item.clone());
    scope.set_parameter(VarKey::positional(1), item.clone());
    let _guard = context::push_scope(scope);
    f()
}
