//! Stack growth for the recursive parser and evaluator.
//!
//! Nested expressions and script-level recursion both recurse natively, so
//! each recursive entry point runs through [`ensure_sufficient_stack`]. The
//! depth limits in the parser and interpreter bound how far that can go.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod stack_tests {
    use super::ensure_sufficient_stack;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(depth(200_000), 200_000);
    }
}
