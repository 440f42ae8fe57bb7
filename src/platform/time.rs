//! Wall-clock access
//!
//! The repository reads the current instant twice per create: once for the
//! id time component and once for `createdAt`. Both go through [`Clock`] so
//! tests can pin time.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::cell::Cell;

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Real time (`Date.now()` on wasm32 via chrono's wasmbind feature)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that starts at a fixed instant and advances by `step_ms` on each read
#[derive(Debug)]
pub struct SteppingClock {
    current_ms: Cell<i64>,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            current_ms: Cell::new(start_ms),
            step_ms,
        }
    }

    /// A clock frozen at `ms`
    pub fn fixed(ms: i64) -> Self {
        Self::new(ms, 0)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.current_ms.get();
        self.current_ms.set(ms.saturating_add(self.step_ms));
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Format an instant the way `Date.prototype.toISOString` does
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
