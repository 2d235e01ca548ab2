//! In-memory circular queue backend.
//!
//! Writes append; when the queue is full a blocking write waits for room
//! up to the timeout, then the oldest item is overwritten. Reads take from
//! the front. Subscribers each get a polling thread that drains the queue
//! every interval and hands items to their callback in order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use dollar_value::error::exception;
use dollar_value::{Pipe, Resource, ResourceHandle, Value};

use crate::runtime::Runtime;

pub const DEFAULT_CAPACITY: usize = 100;

struct QueueState {
    items: VecDeque<Value>,
    paused: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    timeout: Duration,
}

impl Shared {
    /// Next deliverable item, or `None` when empty or paused.
    fn take(&self) -> Option<Value> {
        let item = {
            let mut state = self.state.lock();
            if state.paused {
                return None;
            }
            state.items.pop_front()
        };
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }
}

pub struct QueueResource {
    name: String,
    shared: Arc<Shared>,
    poll_interval: Duration,
    /// Stop channel per subscription id.
    subscribers: Mutex<FxHashMap<String, Sender<()>>>,
}

impl QueueResource {
    pub fn new(name: impl Into<String>, capacity: usize, poll_interval: Duration, timeout: Duration) -> Self {
        QueueResource {
            name: name.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    items: VecDeque::with_capacity(capacity),
                    paused: false,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity: capacity.max(1),
                timeout,
            }),
            poll_interval,
            subscribers: Mutex::new(FxHashMap::default()),
        }
    }

    /// A default-capacity queue polled at the runtime's configured rate.
    pub fn for_runtime(name: impl Into<String>, runtime: &Runtime) -> Self {
        let config = runtime.config();
        QueueResource::new(name, DEFAULT_CAPACITY, config.poll_interval, config.blocking_timeout)
    }

    /// Wrap in a handle with a fresh lifecycle.
    pub fn into_handle(self) -> ResourceHandle {
        ResourceHandle::new(Arc::new(self))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn cancel_all(&self) {
        let stopped: Vec<(String, Sender<()>)> = self.subscribers.lock().drain().collect();
        for (id, stop) in stopped {
            debug!(queue = %self.name, %id, "stop subscriber");
            let _ = stop.try_send(());
        }
    }
}

fn poll(name: &str, shared: &Shared, callback: &Pipe) {
    while let Some(item) = shared.take() {
        trace!(queue = name, "deliver");
        if let Err(err) = callback(&item) {
            warn!(queue = name, %err, "subscriber callback failed");
        }
    }
}

impl Resource for QueueResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, blocking: bool, mutating: bool) -> Value {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if blocking {
            let deadline = Instant::now() + shared.timeout;
            while state.items.is_empty() {
                if shared.not_empty.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
        }
        let item = if mutating {
            state.items.pop_front()
        } else {
            state.items.front().cloned()
        };
        drop(state);
        match item {
            Some(item) => {
                if mutating {
                    shared.not_full.notify_one();
                }
                item
            }
            None => Value::Void,
        }
    }

    fn write(&self, value: Value, blocking: bool, _mutating: bool) -> Value {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if blocking {
            let deadline = Instant::now() + shared.timeout;
            while state.items.len() >= shared.capacity {
                if shared.not_full.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
        }
        if state.items.len() >= shared.capacity {
            trace!(queue = %self.name, "full, overwriting oldest item");
            state.items.pop_front();
        }
        state.items.push_back(value.clone());
        drop(state);
        shared.not_empty.notify_one();
        value
    }

    fn drain(&self) -> Value {
        let items: Vec<Value> = self.shared.state.lock().items.drain(..).collect();
        self.shared.not_full.notify_all();
        Value::list(items)
    }

    fn all(&self) -> Value {
        Value::list(self.shared.state.lock().items.iter().cloned().collect())
    }

    fn size(&self) -> Value {
        let len = self.shared.state.lock().items.len();
        Value::int(i64::try_from(len).unwrap_or(i64::MAX))
    }

    fn subscribe(&self, callback: Pipe, id: &str) -> Value {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        let interval = self.poll_interval;
        let name = self.name.clone();
        let spawned = thread::Builder::new()
            .name(format!("dollar-queue-{name}"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => poll(&name, &shared, &callback),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });
        if let Err(err) = spawned {
            return exception(format!("cannot start subscriber for {}: {err}", self.name)).into_value();
        }
        debug!(queue = %self.name, %id, "subscribe");
        if let Some(previous) = self.subscribers.lock().insert(id.to_string(), stop_tx) {
            let _ = previous.try_send(());
        }
        Value::Void
    }

    fn unsubscribe(&self, id: &str) -> Value {
        if let Some(stop) = self.subscribers.lock().remove(id) {
            debug!(queue = %self.name, %id, "unsubscribe");
            let _ = stop.try_send(());
        }
        Value::Void
    }

    fn pause(&self) -> Value {
        self.shared.state.lock().paused = true;
        Value::Void
    }

    fn unpause(&self) -> Value {
        self.shared.state.lock().paused = false;
        Value::Void
    }

    fn stop(&self) -> Value {
        self.cancel_all();
        Value::Void
    }

    fn destroy(&self) -> Value {
        self.cancel_all();
        self.shared.state.lock().items.clear();
        self.shared.not_full.notify_all();
        Value::Void
    }
}

impl Drop for QueueResource {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests;
