//! Clock Adapters
//!
//! Implements the `Clock` port with wall-clock and manually driven time.

use crate::ports::outbound::Clock;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Set current time.
    pub fn set(&self, time: DateTime<Utc>) {
        *self.current.write() = time;
    }

    /// Advance time.
    pub fn advance(&self, by: Duration) {
        *self.current.write() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default() + Duration::seconds(1_700_000_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read()
    }
}
