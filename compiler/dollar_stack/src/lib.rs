//! Stack growth for deep lazy forcing.
//!
//! Forcing a reactive graph recurses through every node, every container
//! child and every listener. The node-level recursion guard stops runaway
//! self-reference at a fixed depth, but legitimately deep (and wide) graphs
//! can still exhaust the native stack before that limit is reached when each
//! level carries several frames. Wrap those recursive paths with
//! [`ensure_sufficient_stack`].
//!
//! - **Native targets**: uses `stacker` to grow the stack on demand.
//! - **WASM targets**: no-op passthrough.

/// Minimum stack space to keep available (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version, calls `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack space in bytes, if the platform can report it.
///
/// Used by trace logging when a forcing chain gets deep.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// WASM version, always unknown.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}
