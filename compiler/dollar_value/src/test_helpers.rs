//! A minimal node for exercising forcing from value-level tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dollar_ir::SourceSegment;
use parking_lot::Mutex;

use crate::{EvalResult, Metadata, NodeId, NodeRef, Pipe, Reactive, Value};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct TestNode {
    id: NodeId,
    source: SourceSegment,
    body: Box<dyn Fn() -> EvalResult + Send + Sync>,
    pub runs: AtomicUsize,
    listeners: Mutex<Vec<(String, Pipe)>>,
    meta: Mutex<Metadata>,
}

impl TestNode {
    pub fn new(body: impl Fn() -> EvalResult + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(TestNode {
            id: NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            source: SourceSegment::unknown(),
            body: Box::new(body),
            runs: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
            meta: Mutex::new(Metadata::new()),
        })
    }
}

/// A node that always evaluates to `value`.
pub fn lazy(value: Value) -> Value {
    let node: NodeRef = TestNode::new(move || Ok(value.clone()));
    Value::node(node)
}

impl Reactive for TestNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn operation(&self) -> &str {
        "test"
    }

    fn source(&self) -> &SourceSegment {
        &self.source
    }

    fn fix(&self, depth: usize, _parallel: bool) -> EvalResult {
        if depth == 0 {
            return Ok(Value::Void);
        }
        self.runs.fetch_add(1, Ordering::SeqCst);
        (self.body)()?.fix(depth)
    }

    fn listen(&self, pipe: Pipe, key: Option<String>) -> EvalResult {
        let key = key.unwrap_or_else(|| format!("l{}", self.listeners.lock().len()));
        self.listeners.lock().push((key.clone(), pipe));
        Ok(Value::string(key))
    }

    fn unlisten(&self, key: &str) -> Value {
        self.listeners.lock().retain(|(k, _)| k != key);
        Value::Void
    }

    fn notify(&self) -> EvalResult {
        let value = self.fix(1, false)?;
        let listeners: Vec<Pipe> = self.listeners.lock().iter().map(|(_, p)| p.clone()).collect();
        for pipe in listeners {
            pipe(&value)?;
        }
        Ok(value)
    }

    fn constrain(&self, _fingerprint: &str) -> EvalResult {
        Ok(Value::Void)
    }

    fn metadata(&self) -> Metadata {
        self.meta.lock().clone()
    }

    fn set_metadata(&self, key: &str, value: &str) {
        self.meta.lock().set(key, value);
    }
}
