//! Pluggable I/O backends and their lifecycle.
//!
//! A backend implements [`Resource`]; the runtime wraps it in a
//! [`ResourceHandle`] whose [`Lifecycle`] sequences the backend's
//! `start`/`stop`/`pause`/`unpause` calls. Backends report failures as
//! error values, never by panicking across this boundary.

use std::fmt;
use std::sync::Arc;

use dollar_diagnostic::ErrorKind;
use parking_lot::Mutex;
use tracing::debug;

use crate::{EvalError, Pipe, Value};

/// Backend contract.
///
/// Lifecycle hooks default to doing nothing and returning `Void`.
pub trait Resource: Send + Sync {
    /// Identifier used in traces (usually the resource URI).
    fn name(&self) -> &str;

    fn read(&self, blocking: bool, mutating: bool) -> Value;

    fn write(&self, value: Value, blocking: bool, mutating: bool) -> Value;

    /// All buffered items, removed.
    fn drain(&self) -> Value;

    /// All buffered items, left in place.
    fn all(&self) -> Value;

    fn size(&self) -> Value;

    /// Deliver items to `callback` on the backend's own schedule.
    fn subscribe(&self, callback: Pipe, id: &str) -> Value;

    fn unsubscribe(&self, id: &str) -> Value;

    fn init(&self) -> Value {
        Value::Void
    }

    fn start(&self) -> Value {
        Value::Void
    }

    fn pause(&self) -> Value {
        Value::Void
    }

    fn unpause(&self) -> Value {
        Value::Void
    }

    fn stop(&self) -> Value {
        Value::Void
    }

    fn destroy(&self) -> Value {
        Value::Void
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Created,
    Running,
    Paused,
    Stopped,
    Failed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    Start,
    Stop,
    Pause,
    Unpause,
    Destroy,
    Error,
}

impl ResourceState {
    /// State reached by `signal`, or `None` when the signal is not valid here.
    pub fn transition(self, signal: Signal) -> Option<ResourceState> {
        use ResourceState::{Created, Failed, Paused, Running, Stopped};
        match (self, signal) {
            (Created | Stopped, Signal::Start) => Some(Running),
            (Running | Paused, Signal::Stop) => Some(Stopped),
            (Running, Signal::Pause) => Some(Paused),
            (Paused, Signal::Unpause) => Some(Running),
            (_, Signal::Destroy) => Some(Stopped),
            (_, Signal::Error) => Some(Failed),
            _ => None,
        }
    }
}

/// Advisory state machine guarding a backend's lifecycle calls.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<ResourceState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle {
            state: Mutex::new(ResourceState::Created),
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> ResourceState {
        *self.state.lock()
    }

    /// Apply `signal`, running `action` with the current state for valid
    /// transitions.
    ///
    /// Invalid signals leave the state alone and return an error value. A
    /// failing action moves the machine to `Failed`. The action runs
    /// unlocked, so a backend may signal its own handle; if such a signal
    /// lands first, the outer transition is dropped.
    pub fn signal(
        &self,
        name: &str,
        signal: Signal,
        action: impl FnOnce(ResourceState) -> Value,
    ) -> Value {
        let from = self.state();
        let Some(next) = from.transition(signal) else {
            return EvalError::new(
                ErrorKind::Exception,
                format!("{signal:?} is not valid for {name} while {from:?}"),
            )
            .into_value();
        };
        let result = action(from);
        let next = if result.is_error() {
            ResourceState::Failed
        } else {
            next
        };
        let mut state = self.state.lock();
        if *state == from {
            debug!(resource = name, ?from, to = ?next, ?signal, "lifecycle transition");
            *state = next;
        } else {
            debug!(resource = name, ?from, now = ?*state, ?signal, "lifecycle transition superseded");
        }
        result
    }
}

/// A backend paired with its lifecycle.
#[derive(Clone)]
pub struct ResourceHandle {
    backend: Arc<dyn Resource>,
    lifecycle: Arc<Lifecycle>,
}

impl ResourceHandle {
    pub fn new(backend: Arc<dyn Resource>) -> Self {
        ResourceHandle {
            backend,
            lifecycle: Arc::new(Lifecycle::default()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Resource> {
        &self.backend
    }

    pub fn state(&self) -> ResourceState {
        self.lifecycle.state()
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn signal(&self, signal: Signal) -> Value {
        let backend = &self.backend;
        self.lifecycle
            .signal(backend.name(), signal, |from| match signal {
                Signal::Start if from == ResourceState::Created => {
                    let init = backend.init();
                    if init.is_error() {
                        init
                    } else {
                        backend.start()
                    }
                }
                Signal::Start => backend.start(),
                Signal::Stop => backend.stop(),
                Signal::Pause => backend.pause(),
                Signal::Unpause => backend.unpause(),
                Signal::Destroy => {
                    if from == ResourceState::Running || from == ResourceState::Paused {
                        let stopped = backend.stop();
                        if stopped.is_error() {
                            return stopped;
                        }
                    }
                    backend.destroy()
                }
                Signal::Error => Value::Void,
            })
    }

    pub fn ptr_eq(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<resource {} {:?}>", self.name(), self.state())
    }
}
