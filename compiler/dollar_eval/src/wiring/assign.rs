//! Variable assignment.
//!
//! - `:=` always declares in the current scope
//! - `=` declares only when it carries a type, a constraint or a
//!   mutability keyword; otherwise it rebinds the nearest existing binding
//! - `?=` re-commits whenever its condition notifies: the right-hand side
//!   while the condition is true, Void while it is false
//! - `*=` commits every value its source delivers
//!
//! The right-hand side is forced to the configured assignment depth before
//! binding, so a bound value never holds a node at its top two levels.
//! Assignment nodes bind into whatever scope is active when they run; the
//! deferred commits of `?=` and `*=` re-attach the scopes active when the
//! assignment first ran.

use std::sync::Arc;

use tracing::{debug, warn};

use dollar_ir::{OpDef, OpKind, SourceSegment, Type, VarKey};
use dollar_value::error::{exception, reserved_name};
use dollar_value::{EvalResult, NodeId, Pipe, Reactive, Value};

use super::{OperatorTableError, Wiring};
use crate::context::{self, ScopeSnapshot};
use crate::force::force;
use crate::runtime::Runtime;
use crate::scope::{BindingFlags, Constraint, ScopeRef, SetOptions};
use crate::subscription::subscribe;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mutability {
    Const,
    Volatile,
}

/// One assignment as the front end describes it.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub target: VarKey,
    pub value: Value,
    /// Required for `?=`.
    pub condition: Option<Value>,
    pub constraint: Option<Constraint>,
    pub declared_type: Option<Type>,
    pub mutability: Option<Mutability>,
    pub export: bool,
    pub source: SourceSegment,
}

impl Assignment {
    pub fn new(target: impl Into<VarKey>, value: Value, source: SourceSegment) -> Self {
        Assignment {
            target: target.into(),
            value,
            condition: None,
            constraint: None,
            declared_type: None,
            mutability: None,
            export: false,
            source,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, predicate: Value, fingerprint: impl Into<String>) -> Self {
        self.constraint = Some(Constraint::new(predicate, fingerprint));
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        self.declared_type = Some(ty);
        self
    }

    #[must_use]
    pub fn constant(mut self) -> Self {
        self.mutability = Some(Mutability::Const);
        self
    }

    #[must_use]
    pub fn volatile(mut self) -> Self {
        self.mutability = Some(Mutability::Volatile);
        self
    }

    #[must_use]
    pub fn exported(mut self) -> Self {
        self.export = true;
        self
    }

    fn declares(&self, op: &OpDef) -> bool {
        op.name == OpDef::DECLARATION.name
            || self.declared_type.is_some()
            || self.constraint.is_some()
            || self.mutability.is_some()
    }

    fn flags(&self) -> BindingFlags {
        match self.mutability {
            Some(Mutability::Const) => BindingFlags::CONST,
            Some(Mutability::Volatile) => BindingFlags::VOLATILE,
            None => BindingFlags::empty(),
        }
    }
}

/// Everything needed to bind one value. Shared with the callbacks of
/// `?=` and `*=`, which commit again later, possibly on another thread.
struct Commit {
    runtime: Runtime,
    target: VarKey,
    constraint: Option<Constraint>,
    declared_type: Option<Type>,
    flags: BindingFlags,
    declare: bool,
    export: bool,
    rhs: Option<NodeId>,
}

impl Commit {
    fn new(runtime: &Runtime, op: &OpDef, assignment: &Assignment) -> Self {
        Commit {
            runtime: runtime.clone(),
            target: assignment.target.clone(),
            constraint: assignment.constraint.clone(),
            declared_type: assignment.declared_type,
            flags: assignment.flags(),
            declare: assignment.declares(op),
            export: assignment.export,
            rhs: assignment.value.as_node().map(|n| n.id()),
        }
    }

    fn scope(&self) -> Result<ScopeRef, dollar_value::EvalError> {
        context::current_scope()
            .ok_or_else(|| exception(format!("no scope to bind '{}' in", self.target)))
    }

    /// Force `value` and bind it in the current scope.
    ///
    /// An error value is handed back unbound.
    fn apply(&self, value: &Value) -> EvalResult {
        if self.runtime.is_builtin(self.target.as_str()) {
            return Err(reserved_name(self.target.as_str()));
        }
        let scope = self.scope()?;
        self.warn_on_prediction();
        if let (Some(constraint), Some(node)) = (&self.constraint, value.as_node()) {
            node.constrain(&constraint.fingerprint)?;
        }

        let config = self.runtime.config();
        let forced = force(value, config.assignment_fix_depth, config.parallel)?;
        if forced.is_error() {
            debug!(variable = %self.target, "error value left unbound");
            return Ok(forced);
        }
        let options = SetOptions {
            declare: self.declare,
            flags: self.flags,
            constraint: self.constraint.clone(),
            declared_type: self.declared_type,
        };
        let bound = scope.set(&self.target, forced, options)?;
        if self.export {
            self.runtime.export(self.target.clone(), bound.clone());
        }
        Ok(bound)
    }

    fn warn_on_prediction(&self) {
        let (Some(expected), Some(node)) = (self.declared_type, self.rhs) else {
            return;
        };
        let threshold = self.runtime.config().type_warning_threshold;
        if let Some(warning) = self.runtime.learner().check(node, expected, threshold) {
            warn!(variable = %self.target, %warning, "assigned value unlikely to match declared type");
        }
    }

    /// Bind Void unless this scope already has the name.
    fn ensure_declared(&self, scope: &ScopeRef) -> Result<(), dollar_value::EvalError> {
        if !scope.has_local(&self.target) {
            self.apply(&Value::Void)?;
        }
        Ok(())
    }

    /// The `?=` commit: the right-hand side while the condition holds,
    /// Void otherwise.
    fn when(&self, holds: bool, rhs: &Value) -> EvalResult {
        if holds {
            self.apply(rhs)
        } else {
            self.apply(&Value::Void)
        }
    }

    fn slot(&self, kind: &str, scope: &ScopeRef) -> String {
        format!("{kind}-{}-{}", scope.id(), self.target)
    }
}

impl Wiring {
    /// Wire an assignment operator (`:=`, `=`, `?=` or `*=`).
    pub fn assign(
        &self,
        op: &'static OpDef,
        assignment: Assignment,
    ) -> Result<Value, OperatorTableError> {
        if op.kind != OpKind::Assignment {
            return Err(OperatorTableError::KindMismatch {
                op: op.name,
                expected: OpKind::Assignment,
                found: op.kind,
            });
        }
        let commit = Arc::new(Commit::new(self.runtime(), op, &assignment));
        let builder = self
            .node(op.name, &assignment.source)
            .inputs(vec![assignment.value.clone()])
            .pure(false);

        let node = if op.name == OpDef::WHEN_ASSIGN.name {
            let condition =
                assignment
                    .condition
                    .clone()
                    .ok_or_else(|| OperatorTableError::MissingCondition {
                        target: assignment.target.to_string(),
                    })?;
            builder.build(move |inputs| when_assign(&commit, &inputs[0], &condition))
        } else if op.name == OpDef::SUBSCRIBE_ASSIGN.name {
            builder.build(move |inputs| subscribe_assign(&commit, &inputs[0]))
        } else {
            builder.build(move |inputs| commit.apply(&inputs[0]))
        };
        debug!(op = op.name, variable = %assignment.target, node = %node.id(), "wired assignment");
        Ok(node.as_value())
    }
}

fn when_assign(commit: &Arc<Commit>, rhs: &Value, condition: &Value) -> EvalResult {
    let scope = commit.scope()?;
    commit.when(condition.truthy()?, rhs)?;

    if let Some(node) = condition.as_node() {
        let snapshot = ScopeSnapshot::capture();
        let deferred = Arc::clone(commit);
        let rhs = rhs.clone();
        let pipe: Pipe = Arc::new(move |delivered: &Value| {
            let holds = delivered.truthy()?;
            let _attached = snapshot.attach();
            deferred.when(holds, &rhs)
        });
        node.listen(pipe, Some(commit.slot("when", &scope)))?;
    }
    Ok(scope.get_opt(&commit.target).unwrap_or(Value::Void))
}

fn subscribe_assign(commit: &Arc<Commit>, rhs: &Value) -> EvalResult {
    let scope = commit.scope()?;
    commit.ensure_declared(&scope)?;

    let resolved = rhs.fix(1)?;
    let source = if resolved.as_resource().is_some() {
        resolved
    } else {
        if rhs.is_node() {
            commit.apply(&resolved)?;
        }
        rhs.clone()
    };
    let snapshot = ScopeSnapshot::capture();
    let deferred = Arc::clone(commit);
    let pipe: Pipe = Arc::new(move |item: &Value| {
        let _attached = snapshot.attach();
        deferred.apply(item)
    });
    let subscription = subscribe(&source, pipe)?;
    commit
        .runtime
        .track_subscription(commit.slot("assign", &scope), subscription);
    Ok(scope.get_opt(&commit.target).unwrap_or(Value::Void))
}
