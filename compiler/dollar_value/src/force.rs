//! Sequential forcing.
//!
//! Nodes resolve through [`Reactive::fix`](crate::Reactive::fix); containers
//! force their children one level shallower. The evaluator layers parallel
//! forcing on top of this.

use dollar_stack::ensure_sufficient_stack;

use crate::{EvalResult, Heap, Value};

impl Value {
    /// Force to `depth`: `0` is a no-op, `1` resolves a node without
    /// touching container children, `n > 1` forces children to `n - 1`.
    pub fn fix(&self, depth: usize) -> EvalResult {
        if depth == 0 {
            return Ok(self.clone());
        }
        ensure_sufficient_stack(|| match self {
            Value::Node(node) => node.fix(depth, false),
            Value::Tagged(tagged) => {
                let fixed = tagged.value.fix(depth)?;
                Ok(fixed.with_metadata(tagged.meta.clone()))
            }
            Value::List(items) if depth > 1 => {
                let items = items
                    .iter()
                    .map(|item| item.fix(depth - 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(Heap::new(items)))
            }
            Value::Map(entries) if depth > 1 => {
                let entries = entries.try_map_values(|v| v.fix(depth - 1))?;
                Ok(Value::map(entries))
            }
            other => Ok(other.clone()),
        })
    }

    /// Force until no node remains anywhere inside the value.
    pub fn fix_deep(&self) -> EvalResult {
        let mut value = self.fix(usize::MAX)?;
        while value.contains_node() {
            value = value.fix(usize::MAX)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
