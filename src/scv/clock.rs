//! Time source for card creation timestamps.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests: every call returns the current instant and then
/// advances it by `step`. A zero step produces equal timestamps on purpose.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// Starts at the Unix epoch and ticks one second per call.
    pub fn ticking() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH, Duration::seconds(1))
    }

    /// Always returns the same instant.
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.lock() = at;
    }

    pub fn peek(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.lock();
        let now = *current;
        *current = now + self.step;
        now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
