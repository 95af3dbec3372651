//! Monotonic millisecond clock, injected so frame timestamps are testable.

use std::time::Instant;

/// Monotonic millisecond tick source.
///
/// Snapshot timestamps come from this trait rather than the wall clock, so
/// tests can stamp frames deterministically.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Clock anchored to its moment of creation via `std::time::Instant`.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock that returns a preset tick, advanced manually from tests
    #[derive(Debug, Default)]
    pub struct FixedClock {
        now: AtomicU64,
    }

    impl FixedClock {
        pub fn at(now_ms: u64) -> Self {
            Self {
                now: AtomicU64::new(now_ms),
            }
        }

        pub fn advance(&self, delta_ms: u64) {
            self.now.fetch_add(delta_ms, Ordering::Relaxed);
        }
    }

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.now.load(Ordering::Relaxed)
        }
    }
}
