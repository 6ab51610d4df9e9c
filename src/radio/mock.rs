//! Mock delay for testing
//!
//! Records the sleep time requested instead of sleeping, so polling and
//! repeat intervals can be checked without waiting.

use embedded_hal_async::delay::DelayNs;
use std::cell::Cell;
use std::rc::Rc;

/// Mock delay; clones share the recorded total
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Total sleep requested so far, in milliseconds
    pub fn total_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }

    /// Forget the sleep recorded so far
    pub fn reset(&self) {
        self.elapsed_ns.set(0);
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}
