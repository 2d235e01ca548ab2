//! Subscriptions: one contract over resources, nodes and plain values.
//!
//! - a resource delivers each item through its backend's subscribe hook,
//!   starting the resource first if nothing has yet
//! - a node delivers every notification through a keyed listener
//! - any other value is delivered once, synchronously
//!
//! Cancelling flips a shared flag checked before every delivery, so a
//! callback already queued on another thread is dropped rather than run.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use dollar_value::{EvalError, NodeRef, Pipe, ResourceHandle, ResourceState, Signal, Value};

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
enum Target {
    Resource(ResourceHandle),
    Node(NodeRef),
    Value,
}

#[derive(Clone)]
pub struct Subscription {
    id: String,
    cancelled: Arc<AtomicBool>,
    target: Target,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The resource this subscription reads from, if any.
    pub fn resource(&self) -> Option<&ResourceHandle> {
        match &self.target {
            Target::Resource(handle) => Some(handle),
            Target::Node(_) | Target::Value => None,
        }
    }

    /// Stop deliveries. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(id = %self.id, "cancel subscription");
        match &self.target {
            Target::Resource(handle) => {
                handle.backend().unsubscribe(&self.id);
            }
            Target::Node(node) => {
                node.unlisten(&self.id);
            }
            Target::Value => {}
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            Target::Resource(handle) => format!("{handle:?}"),
            Target::Node(node) => format!("{node:?}"),
            Target::Value => "value".to_string(),
        };
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("target", &target)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Deliver every value `source` produces to `callback` until cancelled.
pub fn subscribe(source: &Value, callback: Pipe) -> Result<Subscription, EvalError> {
    let id = format!("sub-{}", NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let guarded: Pipe = Arc::new(move |item: &Value| {
        if flag.load(Ordering::Acquire) {
            return Ok(Value::Void);
        }
        callback(item)
    });

    let target = match source.untagged() {
        Value::Resource(handle) => {
            if handle.state() == ResourceState::Created {
                let started = handle.signal(Signal::Start);
                if let Some(err) = started.as_error() {
                    return Err(err.clone());
                }
            }
            let result = handle.backend().subscribe(guarded, &id);
            if let Some(err) = result.as_error() {
                return Err(err.clone());
            }
            Target::Resource(handle.clone())
        }
        Value::Node(node) => {
            node.listen(guarded, Some(id.clone()))?;
            Target::Node(Arc::clone(node))
        }
        other => {
            guarded(other)?;
            Target::Value
        }
    };
    debug!(%id, "subscribe");
    Ok(Subscription {
        id,
        cancelled,
        target,
    })
}
