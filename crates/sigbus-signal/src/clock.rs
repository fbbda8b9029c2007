use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Millisecond time source used for update stamps and validity checks.
///
/// Readings must be cheap, non-blocking and non-decreasing. They wrap at
/// `u32::MAX`; elapsed time is always computed with wrapping subtraction.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u32;
}

/// Milliseconds elapsed since the clock was created.
///
/// Readings wrap every 2^32 ms (about 49.7 days), the same period as the
/// wire timestamp. Validity is judged on wrapped elapsed time, so a record
/// left stale for a whole period reads as fresh again for its timeout.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// A clock that only moves when told to. Used for replay and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU32,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: AtomicU32::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.store(now_ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: u32) {
        self.now.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u32 {
        self.now.load(Ordering::Acquire)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_millis(&self) -> u32 {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_millis(), 100);
        clock.advance(50);
        assert_eq!(clock.now_millis(), 150);
        clock.set(10);
        assert_eq!(clock.now_millis(), 10);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(second >= first);
    }

    #[test]
    fn shared_clock_reads_through_arc() {
        let clock = std::sync::Arc::new(ManualClock::new(7));
        let shared = std::sync::Arc::clone(&clock);
        clock.advance(3);
        assert_eq!(shared.now_millis(), 10);
    }
}
