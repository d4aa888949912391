//! ICS parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::{debug, warn};

use super::{
    ICS_DATETIME_UTC, PROP_AI_SUGGESTED, PROP_COMPLETED, PROP_CREATED_BY, PROP_REMINDER_SENT,
    PROP_REMINDER_TYPE, priority_from_ics,
};
use crate::error::{CalResult, CalendarError};
use crate::event::{CalendarEvent, Category, EventStatus, EventTime, Reminder, ReminderKind};
use crate::recurrence::parse_rrule;

/// Parse every VEVENT in `content`.
///
/// Floating and all-day times are placed in `default_tz`, as are TZIDs that
/// aren't IANA names. Unknown categories become `task`, and an RRULE outside
/// the supported subset is dropped with a warning.
pub fn parse_ics(content: &str, default_tz: Tz) -> CalResult<Vec<CalendarEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| CalendarError::IcsParse(e.to_string()))?;

    calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(|vevent| parse_vevent(vevent, default_tz))
        .collect()
}

fn parse_vevent(vevent: &Component, default_tz: Tz) -> CalResult<CalendarEvent> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| CalendarError::IcsParse("VEVENT without UID".to_string()))?;
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(No title)".to_string());

    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .ok_or_else(|| CalendarError::IcsParse(format!("{}: missing or invalid DTSTART", uid)))
        .and_then(|dpt| to_event_time(dpt, default_tz))?;
    let end = match vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
    {
        Some(dpt) => to_event_time(dpt, default_tz)?,
        None => start,
    };

    let mut event = CalendarEvent::new(uid, summary, start, end)?;

    event.description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    event.location = vevent.find_prop("LOCATION").map(|p| p.val.to_string());

    event.status = vevent
        .find_prop("STATUS")
        .map(|p| match p.val.as_ref() {
            "TENTATIVE" => EventStatus::Tentative,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        })
        .unwrap_or(EventStatus::Confirmed);

    if let Some(prop) = vevent.find_prop("CATEGORIES") {
        let first = prop.val.as_ref().split(',').next().unwrap_or_default();
        event.category = first.parse().unwrap_or_else(|_| {
            debug!(event = %event.id, category = first, "Unknown category, using task");
            Category::Task
        });
    }

    if let Some(value) = vevent
        .find_prop("PRIORITY")
        .and_then(|p| p.val.as_ref().trim().parse::<u8>().ok())
    {
        event.priority = priority_from_ics(value);
    }

    if let Some(prop) = vevent.find_prop("RRULE") {
        match parse_rrule(prop.val.as_ref()) {
            Ok(pattern) => event.recurrence = Some(pattern),
            Err(e) => warn!(event = %event.id, "Ignoring RRULE: {}", e),
        }
    }

    event.parent_event_id = vevent.find_prop("RELATED-TO").map(|p| p.val.to_string());
    event.completed = flag(vevent, PROP_COMPLETED);
    event.ai_suggested = flag(vevent, PROP_AI_SUGGESTED);
    if let Some(prop) = vevent.find_prop(PROP_CREATED_BY) {
        event.created_by = prop.val.to_string();
    }

    let created = utc_prop(vevent, "CREATED");
    let modified = utc_prop(vevent, "LAST-MODIFIED").or_else(|| utc_prop(vevent, "DTSTAMP"));
    event.created_at = created.or(modified).unwrap_or(event.start.at);
    event.updated_at = modified.unwrap_or(event.created_at);

    event.reminders = vevent
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .filter_map(parse_alarm)
        .collect();

    Ok(event)
}

/// Convert icalendar's DatePerhapsTime to an EventTime
fn to_event_time(dpt: DatePerhapsTime, default_tz: Tz) -> CalResult<EventTime> {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::from_local(d.and_time(NaiveTime::MIN), default_tz),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => Ok(EventTime::utc(dt)),
            icalendar::CalendarDateTime::Floating(naive) => {
                EventTime::from_local(naive, default_tz)
            }
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                let tz = tzid.parse::<Tz>().unwrap_or_else(|_| {
                    debug!(tzid = %tzid, "Unknown TZID, using {}", default_tz);
                    default_tz
                });
                EventTime::from_local(date_time, tz)
            }
        },
    }
}

fn flag(component: &Component, name: &str) -> bool {
    component
        .find_prop(name)
        .is_some_and(|p| p.val.as_ref().eq_ignore_ascii_case("TRUE"))
}

fn utc_prop(component: &Component, name: &str) -> Option<DateTime<Utc>> {
    let value = component.find_prop(name)?.val.to_string();
    NaiveDateTime::parse_from_str(&value, ICS_DATETIME_UTC)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Only alarms that fire before the start map onto reminders
fn parse_alarm(alarm: &Component) -> Option<Reminder> {
    let trigger = alarm.find_prop("TRIGGER")?.val.to_string();
    let minutes_before = parse_trigger_minutes(&trigger)?;

    let kind = alarm
        .find_prop(PROP_REMINDER_TYPE)
        .and_then(|p| p.val.as_ref().parse::<ReminderKind>().ok())
        .unwrap_or(ReminderKind::Popup);

    let mut reminder = Reminder::new(kind, minutes_before);
    reminder.sent = flag(alarm, PROP_REMINDER_SENT);
    Some(reminder)
}

/// Parse a TRIGGER value (-PT30M, -P1D, PT0S) to minutes before the event
fn parse_trigger_minutes(value: &str) -> Option<u32> {
    let (is_after, duration_str) = match value.strip_prefix('-') {
        Some(rest) => (false, rest),
        None => (true, value.trim_start_matches('+')),
    };

    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let minutes = u32::try_from(std_duration.as_secs() / 60).ok()?;

    if is_after && minutes > 0 {
        return None;
    }
    Some(minutes)
}
