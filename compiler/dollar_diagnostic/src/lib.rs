//! Dollar diagnostics.
//!
//! - [`ErrorKind`]: the failure taxonomy shared by every runtime layer
//! - [`LineOffsetTable`]: byte offset to line/column lookup
//! - [`Location`] and the excerpt renderers used in user-visible error text

mod error_kind;
mod excerpt;
pub mod span_utils;

pub use error_kind::ErrorKind;
pub use excerpt::{locate, short_source_message, source_message, Location, MAX_CONTEXT_CHARS};
pub use span_utils::LineOffsetTable;
