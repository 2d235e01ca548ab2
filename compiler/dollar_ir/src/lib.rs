//! Dollar IR - the contract between the parsing front end and the runtime.
//!
//! The runtime never parses text. The front end hands it:
//! - [`SourceText`] and [`SourceSegment`] for source-location metadata
//! - [`OpToken`] records carrying an operator definition, its operands,
//!   the source window and the reactivity/purity flags
//! - [`VarKey`] variable names and [`Type`] annotations
//!
//! Operator definitions ([`OpDef`]) form a static table; the runtime
//! validates its operator builders against that table.

mod op;
mod source;
mod span;
mod types;
mod var_key;

pub use op::{OpDef, OpKind, OpToken, OPERATORS};
pub use source::{SourceSegment, SourceText};
pub use span::Span;
pub use types::{Type, UnknownType};
pub use var_key::VarKey;
