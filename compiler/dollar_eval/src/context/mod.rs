//! Per-thread execution context.
//!
//! Each thread owns three stacks: the active scopes, the nodes currently
//! notifying, and the nodes currently executing. All three are pushed
//! through RAII guards so early returns and unwinding keep them balanced.
//!
//! Work that hops threads (listener callbacks, resource subscriptions,
//! parallel forcing) carries a [`ScopeSnapshot`] taken where it was built
//! and attaches it on the thread that runs it.

use std::cell::RefCell;
use std::marker::PhantomData;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{error, trace};

use dollar_value::error::{recursion_limit_exceeded, scope_stack_corrupted};
use dollar_value::{EvalError, NodeId};

use crate::scope::ScopeRef;

thread_local! {
    static CONTEXT: RefCell<ExecContext> = RefCell::new(ExecContext::default());
}

#[derive(Default)]
struct ExecContext {
    scopes: Vec<ScopeRef>,
    notifying: FxHashSet<NodeId>,
    calls: Vec<NodeId>,
    /// Set when a guard found the scope stack out of order on drop.
    corrupted: Option<EvalError>,
}

/// Innermost scope active on this thread.
pub fn current_scope() -> Option<ScopeRef> {
    CONTEXT.with(|ctx| ctx.borrow().scopes.last().cloned())
}

pub fn scope_depth() -> usize {
    CONTEXT.with(|ctx| ctx.borrow().scopes.len())
}

/// Make `scope` the current scope until the guard drops.
pub fn push_scope(scope: ScopeRef) -> ScopeGuard {
    trace!(scope = %scope.name(), id = scope.id(), "push scope");
    CONTEXT.with(|ctx| ctx.borrow_mut().scopes.push(scope.clone()));
    ScopeGuard {
        scope,
        _not_send: PhantomData,
    }
}

/// Pop `expected` off the scope stack.
///
/// Popping anything but the top is a fatal consistency failure. The scope
/// is still removed so the stack does not leak it.
pub fn pop_scope(expected: &ScopeRef) -> Result<(), EvalError> {
    CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        match ctx.scopes.last() {
            Some(top) if top.ptr_eq(expected) => {
                ctx.scopes.pop();
                Ok(())
            }
            top => {
                let found = top.map_or_else(|| "nothing".to_string(), |s| format!("'{}'", s.name()));
                let err = scope_stack_corrupted(format!(
                    "expected scope '{}' on top, found {found}",
                    expected.name()
                ));
                if let Some(pos) = ctx.scopes.iter().rposition(|s| s.ptr_eq(expected)) {
                    ctx.scopes.remove(pos);
                }
                Err(err)
            }
        }
    })
}

/// Take the consistency failure recorded by a dropped guard, if any.
pub fn take_corruption() -> Option<EvalError> {
    CONTEXT.with(|ctx| ctx.borrow_mut().corrupted.take())
}

/// Pops its scope on drop.
#[must_use = "the scope is popped as soon as the guard drops"]
pub struct ScopeGuard {
    scope: ScopeRef,
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        trace!(scope = %self.scope.name(), "pop scope");
        if let Err(err) = pop_scope(&self.scope) {
            error!(%err, "scope stack corrupted");
            CONTEXT.with(|ctx| {
                let mut ctx = ctx.borrow_mut();
                if ctx.corrupted.is_none() {
                    ctx.corrupted = Some(err);
                }
            });
        }
    }
}

/// Mark `id` as notifying. `None` when it already is on this thread, so a
/// re-entrant notify can be skipped.
pub fn enter_notify(id: NodeId) -> Option<NotifyGuard> {
    CONTEXT.with(|ctx| ctx.borrow_mut().notifying.insert(id)).then_some(NotifyGuard {
        id,
        _not_send: PhantomData,
    })
}

pub struct NotifyGuard {
    id: NodeId,
    _not_send: PhantomData<*const ()>,
}

impl Drop for NotifyGuard {
    fn drop(&mut self) {
        CONTEXT.with(|ctx| ctx.borrow_mut().notifying.remove(&self.id));
    }
}

/// Push a node execution frame, failing once `limit` frames are active.
pub fn enter_node(id: NodeId, limit: usize) -> Result<CallGuard, EvalError> {
    CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        if ctx.calls.len() >= limit {
            return Err(recursion_limit_exceeded(limit));
        }
        ctx.calls.push(id);
        Ok(CallGuard {
            _not_send: PhantomData,
        })
    })
}

/// Number of node executions active on this thread.
pub fn call_depth() -> usize {
    CONTEXT.with(|ctx| ctx.borrow().calls.len())
}

pub struct CallGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        CONTEXT.with(|ctx| ctx.borrow_mut().calls.pop());
    }
}

/// Immutable copy of a thread's scope stack.
#[derive(Clone, Default)]
pub struct ScopeSnapshot {
    scopes: SmallVec<[ScopeRef; 4]>,
}

impl ScopeSnapshot {
    /// Snapshot the current thread's scope stack, outermost first.
    pub fn capture() -> Self {
        CONTEXT.with(|ctx| ScopeSnapshot {
            scopes: ctx.borrow().scopes.iter().cloned().collect(),
        })
    }

    /// A snapshot holding one scope.
    pub fn of(scope: ScopeRef) -> Self {
        let mut scopes = SmallVec::new();
        scopes.push(scope);
        ScopeSnapshot { scopes }
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn top(&self) -> Option<&ScopeRef> {
        self.scopes.last()
    }

    /// Push every captured scope onto this thread's stack; the guard pops
    /// them again in reverse order.
    pub fn attach(&self) -> AttachGuard {
        AttachGuard {
            guards: self.scopes.iter().cloned().map(push_scope).collect(),
        }
    }
}

impl std::fmt::Debug for ScopeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.scopes.iter().map(ScopeRef::name))
            .finish()
    }
}

#[must_use = "the snapshot is detached as soon as the guard drops"]
pub struct AttachGuard {
    guards: SmallVec<[ScopeGuard; 4]>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

#[cfg(test)]
mod tests;
