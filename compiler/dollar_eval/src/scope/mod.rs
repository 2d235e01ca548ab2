//! Lexical scopes.
//!
//! A scope binds variable names to values, each binding carrying an
//! optional constraint, an optional declared type and mutability flags.
//! Scopes chain to a parent; lookups walk outward until a binding is found.
//!
//! Scopes are shared between threads (a listener can fire on a resource
//! thread and assign into the scope it was declared in), so a scope is an
//! `Arc<RwLock<_>>` behind the [`ScopeRef`] handle. Locks are never held
//! while user code runs: constraint predicates, listeners and error
//! handlers are all called after the guard is released.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use dollar_ir::{SourceText, Type, VarKey};
use dollar_value::error::{
    constraint_violation, declared_type_mismatch, immutable_variable, variable_not_found,
};
use dollar_value::{EvalError, EvalResult, Pipe, Value};

use crate::context;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Replaces a failing node's result with a fallback value, or re-raises.
pub type ErrorHandler = Arc<dyn Fn(&EvalError) -> EvalResult + Send + Sync>;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct BindingFlags: u8 {
        /// Assigned once; a second assignment fails.
        const CONST = 1;
        /// May be written from any thread without a declaration.
        const VOLATILE = 1 << 1;
        /// Introduced by a declaration rather than a plain assignment.
        const DECLARED = 1 << 2;
        /// Bound by the runtime (`it`, `previous`, positional arguments).
        const PARAMETER = 1 << 3;
    }
}

/// A predicate every value bound to a variable must satisfy.
#[derive(Clone, Debug)]
pub struct Constraint {
    /// Evaluated with `it` bound to the candidate and `previous` to the
    /// value being replaced.
    pub predicate: Value,
    /// Source text of the predicate; two constraints with the same
    /// fingerprint are the same constraint.
    pub fingerprint: String,
}

impl Constraint {
    pub fn new(predicate: Value, fingerprint: impl Into<String>) -> Self {
        Constraint {
            predicate,
            fingerprint: fingerprint.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub constraint: Option<Constraint>,
    pub declared_type: Option<Type>,
    pub flags: BindingFlags,
}

/// How [`ScopeRef::set`] binds a value.
#[derive(Clone, Debug, Default)]
pub struct SetOptions {
    /// Bind in this scope even when an outer scope declares the name.
    pub declare: bool,
    pub flags: BindingFlags,
    pub constraint: Option<Constraint>,
    pub declared_type: Option<Type>,
}

impl SetOptions {
    pub fn declaration() -> Self {
        SetOptions {
            declare: true,
            ..SetOptions::default()
        }
    }
}

struct Scope {
    id: u64,
    name: String,
    parent: Option<ScopeRef>,
    bindings: FxHashMap<VarKey, Binding>,
    listeners: FxHashMap<VarKey, Vec<(String, Pipe)>>,
    error_handler: Option<ErrorHandler>,
    source: Option<Arc<SourceText>>,
}

/// Shared handle to a scope.
#[derive(Clone)]
pub struct ScopeRef(Arc<RwLock<Scope>>);

impl ScopeRef {
    /// A scope with no parent.
    pub fn root(name: impl Into<String>) -> Self {
        ScopeRef::build(name.into(), None, None)
    }

    /// A fresh scope whose parent is `self`. Inherits the source text.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let source = self.0.read().source.clone();
        ScopeRef::build(name.into(), Some(self.clone()), source)
    }

    fn build(name: String, parent: Option<ScopeRef>, source: Option<Arc<SourceText>>) -> Self {
        ScopeRef(Arc::new(RwLock::new(Scope {
            id: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            name,
            parent,
            bindings: FxHashMap::default(),
            listeners: FxHashMap::default(),
            error_handler: None,
            source,
        })))
    }

    #[must_use]
    pub fn with_source(self, source: Arc<SourceText>) -> Self {
        self.0.write().source = Some(source);
        self
    }

    pub fn id(&self) -> u64 {
        self.0.read().id
    }

    pub fn name(&self) -> String {
        self.0.read().name.clone()
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.0.read().parent.clone()
    }

    pub fn source(&self) -> Option<Arc<SourceText>> {
        self.0.read().source.clone()
    }

    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        self.0.write().error_handler = Some(handler);
    }

    /// Names bound directly in this scope.
    pub fn variables(&self) -> Vec<VarKey> {
        let mut keys: Vec<VarKey> = self.0.read().bindings.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Nearest scope, starting here, that binds `key`.
    pub fn declaring(&self, key: &VarKey) -> Option<ScopeRef> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let next = {
                let guard = scope.0.read();
                if guard.bindings.contains_key(key) {
                    drop(guard);
                    return Some(scope);
                }
                guard.parent.clone()
            };
            current = next;
        }
        None
    }

    /// The binding for `key` in the nearest scope that has one.
    pub fn binding(&self, key: &VarKey) -> Option<Binding> {
        let scope = self.declaring(key)?;
        let guard = scope.0.read();
        guard.bindings.get(key).cloned()
    }

    /// Look `key` up through the chain; absent names are `VARIABLE_NOT_FOUND`.
    pub fn get(&self, key: &VarKey) -> EvalResult {
        self.get_opt(key)
            .ok_or_else(|| variable_not_found(key.as_str()))
    }

    /// Look `key` up for callers that tolerate absence.
    pub fn get_opt(&self, key: &VarKey) -> Option<Value> {
        self.binding(key).map(|b| b.value)
    }

    pub fn has(&self, key: &VarKey) -> bool {
        self.declaring(key).is_some()
    }

    /// Whether `key` is bound in this scope itself.
    pub fn has_local(&self, key: &VarKey) -> bool {
        self.0.read().bindings.contains_key(key)
    }

    /// Constraint predicate currently bound to `key`.
    pub fn constraint_of(&self, key: &VarKey) -> Option<Value> {
        self.binding(key)?.constraint.map(|c| c.predicate)
    }

    /// Fingerprint of the constraint currently bound to `key`.
    pub fn sub_type_of(&self, key: &VarKey) -> Option<String> {
        self.binding(key)?.constraint.map(|c| c.fingerprint)
    }

    pub fn declared_type_of(&self, key: &VarKey) -> Option<Type> {
        self.binding(key)?.declared_type
    }

    /// Bind a runtime parameter directly in this scope, bypassing
    /// constraints and mutability.
    pub fn set_parameter(&self, key: impl Into<VarKey>, value: Value) {
        let key = key.into();
        let mut guard = self.0.write();
        guard.bindings.insert(
            key,
            Binding {
                value,
                constraint: None,
                declared_type: None,
                flags: BindingFlags::PARAMETER,
            },
        );
    }

    /// Bind `value` to `key`.
    ///
    /// A declaration binds here; anything else rebinds in the nearest scope
    /// that already has the name, falling back to this one. Constraints and
    /// declared types stick to the binding: a later assignment without its
    /// own constraint is still checked against the earlier one. Variable
    /// listeners fire after the new value is committed.
    #[tracing::instrument(level = "trace", skip_all, fields(scope = self.id(), key = %key))]
    pub fn set(&self, key: &VarKey, value: Value, options: SetOptions) -> EvalResult {
        let target = if options.declare {
            self.clone()
        } else {
            self.declaring(key).unwrap_or_else(|| self.clone())
        };

        let (previous, constraint, declared_type, flags) = {
            let guard = target.0.read();
            match guard.bindings.get(key) {
                Some(existing) if existing.flags.contains(BindingFlags::CONST) => {
                    return Err(immutable_variable(key.as_str()));
                }
                Some(existing) => (
                    existing.value.clone(),
                    options.constraint.or_else(|| existing.constraint.clone()),
                    options.declared_type.or(existing.declared_type),
                    existing.flags - BindingFlags::PARAMETER,
                ),
                None => (
                    Value::Void,
                    options.constraint,
                    options.declared_type,
                    BindingFlags::empty(),
                ),
            }
        };

        // Void is "unset" and passes any declaration.
        let checked = !value.is_void();
        if let (true, Some(expected), Some(actual)) = (checked, declared_type, value.type_of()) {
            if !expected.accepts(actual) {
                warn!(variable = %key, %expected, %actual, "declared type mismatch");
                return Err(declared_type_mismatch(
                    key.as_str(),
                    expected.name(),
                    actual.name(),
                ));
            }
        }
        if let (true, Some(constraint)) = (checked, &constraint) {
            target.check_constraint(key, &value, &previous, constraint)?;
        }

        let mut flags = flags | options.flags;
        if options.declare {
            flags |= BindingFlags::DECLARED;
        }
        let listeners: Vec<Pipe> = {
            let mut guard = target.0.write();
            // The checks above ran unlocked; a const may have landed since.
            if guard
                .bindings
                .get(key)
                .is_some_and(|existing| existing.flags.contains(BindingFlags::CONST))
            {
                return Err(immutable_variable(key.as_str()));
            }
            guard.bindings.insert(
                key.clone(),
                Binding {
                    value: value.clone(),
                    constraint,
                    declared_type,
                    flags,
                },
            );
            guard
                .listeners
                .get(key)
                .map(|ls| ls.iter().map(|(_, pipe)| pipe.clone()).collect())
                .unwrap_or_default()
        };
        debug!(variable = %key, scope = %target.name(), listeners = listeners.len(), "set");

        for pipe in listeners {
            pipe(&value)?;
        }
        Ok(value)
    }

    fn check_constraint(
        &self,
        key: &VarKey,
        value: &Value,
        previous: &Value,
        constraint: &Constraint,
    ) -> Result<(), EvalError> {
        let check = self.child("constraint");
        check.set_parameter("it", value.clone());
        check.set_parameter("previous", previous.clone());
        let _guard = context::push_scope(check);
        if constraint.predicate.truthy()? {
            Ok(())
        } else {
            warn!(variable = %key, constraint = %constraint.fingerprint, "constraint violated");
            Err(constraint_violation(key.as_str(), &constraint.fingerprint))
        }
    }

    /// Call `pipe` with every value later bound to `key`.
    ///
    /// The listener lives on the scope that declares `key` (this one when
    /// nothing does yet). Registering an existing `id` replaces its pipe.
    pub fn listen(&self, key: &VarKey, id: impl Into<String>, pipe: Pipe) {
        let id = id.into();
        let target = self.declaring(key).unwrap_or_else(|| self.clone());
        let mut guard = target.0.write();
        let listeners = guard.listeners.entry(key.clone()).or_default();
        match listeners.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = pipe,
            None => listeners.push((id, pipe)),
        }
    }

    pub fn unlisten(&self, key: &VarKey, id: &str) {
        let target = self.declaring(key).unwrap_or_else(|| self.clone());
        let mut guard = target.0.write();
        if let Some(listeners) = guard.listeners.get_mut(key) {
            listeners.retain(|(existing, _)| existing != id);
        }
    }

    /// Route a non-fatal error to the nearest error handler in the chain.
    ///
    /// Fatal errors, and errors with no handler in reach, are returned as
    /// `Err` for the caller to propagate.
    pub fn handle_error(&self, err: EvalError) -> EvalResult {
        if err.is_fatal() {
            return Err(err);
        }
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let (handler, parent) = {
                let guard = scope.0.read();
                (guard.error_handler.clone(), guard.parent.clone())
            };
            if let Some(handler) = handler {
                debug!(kind = %err.kind, scope = %scope.name(), "error handled");
                return handler(&err);
            }
            current = parent;
        }
        Err(err)
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.0.read();
        write!(f, "Scope({}#{}, {} bindings)", guard.name, guard.id, guard.bindings.len())
    }
}

#[cfg(test)]
mod tests;
