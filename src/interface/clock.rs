// Time sources for the search loop. Every wait in the executor goes through a Clock,
// so tests can advance a virtual clock instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary origin, plus blocking waits.
pub trait Clock {
    /// Time since the clock's origin.
    fn now(&self) -> Duration;
    /// Blocks, or pretends to, for `duration`.
    fn sleep(&self, duration: Duration);

    /// Time elapsed since `since`, saturating at zero.
    fn elapsed_since(&self, since: Duration) -> Duration {
        self.now().saturating_sub(since)
    }
}

/// Wall clock; `sleep` blocks the thread.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is now.
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let step = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(step, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }

    // Sleeping just advances the shared time
    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
