//! The interface a lazy computation node presents to the value model.
//!
//! Nodes live in the evaluator; values only see them through [`Reactive`],
//! so every value operation on an unresolved node forces it through this
//! trait and re-applies itself to the concrete result.

use std::fmt;
use std::sync::Arc;

use dollar_ir::SourceSegment;

use crate::{EvalResult, Metadata, Value};

/// Callback registered on a node or resource: receives each delivered value.
pub type Pipe = Arc<dyn Fn(&Value) -> EvalResult + Send + Sync>;

/// Shared handle to a node.
pub type NodeRef = Arc<dyn Reactive>;

/// Unique node identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Reactive: Send + Sync {
    fn id(&self) -> NodeId;

    /// Name of the operation that built the node.
    fn operation(&self) -> &str;

    fn source(&self) -> &SourceSegment;

    /// Run the deferred function, then force the result to `depth`.
    ///
    /// `depth == 0` leaves the node untouched.
    fn fix(&self, depth: usize, parallel: bool) -> EvalResult;

    /// Register `pipe` under `key` (generated when `None`); returns the key.
    fn listen(&self, pipe: Pipe, key: Option<String>) -> EvalResult;

    /// Remove a listener; unknown keys are ignored.
    fn unlisten(&self, key: &str) -> Value;

    /// Force once and hand the result to every listener in registration order.
    fn notify(&self) -> EvalResult;

    /// Bind a constraint fingerprint to this node. A node already bound to a
    /// different fingerprint rejects the new one.
    fn constrain(&self, fingerprint: &str) -> EvalResult;

    fn metadata(&self) -> Metadata;

    fn set_metadata(&self, key: &str, value: &str);
}

impl fmt::Debug for dyn Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{}>", self.operation(), self.id())
    }
}
