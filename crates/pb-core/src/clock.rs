//! Millisecond clock used to mint item ids and stamp history snapshots.

use std::cell::Cell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `SystemTime`. Not available on
/// `wasm32-unknown-unknown`; the WASM bridge supplies its own clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or(0)
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Deterministic clock that advances by `step` on every read.
#[derive(Debug, Clone)]
pub struct StepClock {
    next: Cell<u64>,
    step: u64,
}

impl StepClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// A clock frozen at `at`.
    pub fn fixed(at: u64) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> u64 {
        let now = self.next.get();
        self.next.set(now.saturating_add(self.step));
        now
    }
}
