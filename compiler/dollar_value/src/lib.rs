//! Dollar value model.
//!
//! - [`Value`]: the tagged runtime value and its factories
//! - arithmetic, comparison, coercion and container operations as
//!   methods on `Value`
//! - [`EvalError`] / [`EvalResult`]: runtime failures and sticky errors
//! - [`Reactive`]: how a lazy node looks from the value side
//! - [`Resource`] / [`ResourceHandle`]: the I/O backend contract and its
//!   lifecycle

mod arith;
mod cast;
mod collection;
mod compare;
pub mod error;
mod force;
mod heap;
mod json;
mod map;
mod meta;
mod reactive;
mod resource;
mod value;

#[cfg(test)]
mod test_helpers;

pub use error::{EvalError, EvalResult};
pub use heap::Heap;
pub use map::ValueMap;
pub use meta::{keys as meta_keys, Metadata};
pub use reactive::{NodeId, NodeRef, Pipe, Reactive};
pub use resource::{Lifecycle, Resource, ResourceHandle, ResourceState, Signal};
pub use value::{RangeValue, Tagged, Value};

pub use dollar_diagnostic::ErrorKind;
pub use dollar_ir::Type;
