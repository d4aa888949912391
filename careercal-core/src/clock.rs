//! Time providers.
//!
//! Anything that depends on "now" (stats, reminders, draft timestamps) takes a
//! `Clock` so results are reproducible in tests.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Timezone that defines "today" and "this week".
    fn timezone(&self) -> Tz;

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.timezone()).date_naive()
    }
}

/// Wall clock in a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    pub timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        SystemClock { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        FixedClock { now, timezone }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        FixedClock {
            now,
            timezone: Tz::UTC,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }
}
