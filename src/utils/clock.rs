//! Time sources.
//!
//! The crawl deadline and profiler timings read time through [`Clock`] so
//! tests can drive them with a [`ManualClock`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A source of monotonic instants and wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// Monotonic "now", used for deadlines and elapsed time.
    fn now(&self) -> Instant;

    /// Wall-clock "now", used for report headers.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the given wall-clock time.
    pub fn new(wall_origin: DateTime<Utc>) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        // Offsets here are small test durations; fall back to the origin if
        // the conversion ever overflows.
        chrono::Duration::from_std(self.offset())
            .map(|d| self.wall_origin + d)
            .unwrap_or(self.wall_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_views() {
        let clock = ManualClock::default();
        let start = clock.now();
        let wall_start = clock.utc_now();

        clock.advance(Duration::from_millis(1500));

        assert_eq!(clock.now() - start, Duration::from_millis(1500));
        assert_eq!(
            (clock.utc_now() - wall_start).num_milliseconds(),
            1500
        );
    }

    #[test]
    fn test_manual_clock_is_frozen_without_advance() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), clock.now());
    }
}
