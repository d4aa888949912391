//! ICS export and import.
//!
//! Events are written as one VEVENT each inside a single VCALENDAR. Recurrence
//! goes through the RRULE codec, reminders become VALARMs, and fields iCalendar
//! has no slot for are carried as `X-CAREERCAL-*` properties.

mod generate;
mod parse;

pub use generate::to_ics;
pub use parse::parse_ics;

const PRODID: &str = "PRODID:-//careercal//EN";

const PROP_COMPLETED: &str = "X-CAREERCAL-COMPLETED";
const PROP_AI_SUGGESTED: &str = "X-CAREERCAL-AI-SUGGESTED";
const PROP_CREATED_BY: &str = "X-CAREERCAL-CREATED-BY";
/// On VALARM: reminder type
const PROP_REMINDER_TYPE: &str = "X-CAREERCAL-TYPE";
/// On VALARM: already delivered
const PROP_REMINDER_SENT: &str = "X-CAREERCAL-SENT";

const ICS_DATETIME_UTC: &str = "%Y%m%dT%H%M%SZ";
const ICS_DATETIME_LOCAL: &str = "%Y%m%dT%H%M%S";

/// RFC 5545 PRIORITY: 1 is highest, 9 lowest, 0 undefined
fn priority_to_ics(priority: crate::event::Priority) -> u8 {
    use crate::event::Priority;
    match priority {
        Priority::High => 1,
        Priority::Medium => 5,
        Priority::Low => 9,
    }
}

fn priority_from_ics(value: u8) -> crate::event::Priority {
    use crate::event::Priority;
    match value {
        1..=4 => Priority::High,
        6..=9 => Priority::Low,
        _ => Priority::Medium,
    }
}
