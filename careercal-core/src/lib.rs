//! Recurring-event and calendar-analytics engine for careercal.
//!
//! - `recurrence` expands templates into instances and handles RRULE text
//! - `conflict`, `stats` and `filter` work over any event slice
//! - `draft` turns language-service drafts into events
//! - `repository` and `reminder` are the persistence and delivery boundaries
//! - `ics` and `settings` serve the CLI

pub mod clock;
pub mod conflict;
pub mod date_range;
pub mod draft;
pub mod error;
pub mod event;
pub mod filter;
pub mod ics;
pub mod recurrence;
pub mod reminder;
pub mod repository;
pub mod settings;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_range::DateRange;
pub use error::{CalResult, CalendarError, RRuleError};
pub use event::{
    CalendarEvent, Category, EventStatus, EventTime, Priority, Reminder, ReminderKind,
};
pub use recurrence::{Frequency, RecurrencePattern};
