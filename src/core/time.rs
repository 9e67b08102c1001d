//! Clock abstraction for testable time-dependent logic
//!
//! Scan durations and token expiry are both measured against wall-clock time,
//! so the collector and token manager take a [`TimeProvider`] rather than
//! calling `Utc::now()` directly.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Abstraction over wall-clock time
pub trait TimeProvider: Send + Sync {
    /// Current wall-clock time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production time provider using the system clock
#[derive(Debug, Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests and replays
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// the component under test and advance the other.
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockTimeProvider {
    /// Create a mock clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current.lock() {
            *current += by;
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = at;
        }
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
