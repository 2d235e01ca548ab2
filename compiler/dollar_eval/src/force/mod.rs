//! Forcing with optional fan-out across the rayon pool.
//!
//! Sequential forcing is the value model's own `Value::fix`. Parallel
//! forcing differs only for containers: children are forced on worker
//! threads, each with the caller's scope stack attached, and collected back
//! in their original order.

use rayon::prelude::*;

use dollar_stack::ensure_sufficient_stack;
use dollar_value::{EvalResult, Value, ValueMap};

use crate::context::ScopeSnapshot;

/// Force `value` to `depth`; `parallel` fans container children out.
pub fn force(value: &Value, depth: usize, parallel: bool) -> EvalResult {
    if !parallel || depth == 0 {
        return value.fix(depth);
    }
    ensure_sufficient_stack(|| match value {
        Value::Node(node) => node.fix(depth, true),
        Value::Tagged(tagged) => {
            let fixed = force(&tagged.value, depth, true)?;
            Ok(fixed.with_metadata(tagged.meta.clone()))
        }
        Value::List(items) if depth > 1 => {
            let snapshot = ScopeSnapshot::capture();
            let items = items
                .par_iter()
                .map(|item| {
                    let _attached = snapshot.attach();
                    force(item, depth - 1, true)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(items))
        }
        Value::Map(entries) if depth > 1 => {
            let snapshot = ScopeSnapshot::capture();
            let pairs: Vec<(&str, &Value)> = entries.iter().collect();
            let forced = pairs
                .par_iter()
                .map(|(key, item)| {
                    let _attached = snapshot.attach();
                    force(item, depth - 1, true).map(|v| ((*key).to_string(), v))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::map(forced.into_iter().collect::<ValueMap>()))
        }
        other => Ok(other.clone()),
    })
}

/// Force until no node remains anywhere inside `value`.
pub fn force_deep(value: &Value, parallel: bool) -> EvalResult {
    let mut forced = force(value, usize::MAX, parallel)?;
    while forced.contains_node() {
        forced = force(&forced, usize::MAX, parallel)?;
    }
    Ok(forced)
}
