//! Stack growth for deep recursion.
//!
//! Every user call passes through [`ensure_sufficient_stack`], so a recursive
//! program runs on heap-allocated stack segments instead of overflowing the
//! native thread stack before the call-depth limit is reached.

/// Runs `f`, first growing the stack if less than the red zone is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Space one call's worth of `execute`/`evaluate` frames may use.
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new segment.
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
