//! Stack growth for the recursive parser and evaluator.
//!
//! Both recurse once per nesting level, and a debug build spends several
//! kilobytes of native stack per level. Spawned threads get 2 MB by default,
//! which is not enough for the default depth limits, so each recursive step
//! grows the stack on demand before running.

/// Remaining stack below which a new segment is allocated (128KB)
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (1MB)
const STACK_PER_SEGMENT: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion_on_small_thread() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| depth(50_000))
            .unwrap();
        assert_eq!(handle.join().unwrap(), 50_000);
    }
}
