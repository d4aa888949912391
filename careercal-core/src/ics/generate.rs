//! ICS generation.

use chrono_tz::Tz;
use icalendar::{Alarm, Calendar, Component, EventLike, Property, Trigger};

use super::{
    ICS_DATETIME_LOCAL, ICS_DATETIME_UTC, PRODID, PROP_AI_SUGGESTED, PROP_COMPLETED,
    PROP_CREATED_BY, PROP_REMINDER_SENT, PROP_REMINDER_TYPE, priority_to_ics,
};
use crate::event::{CalendarEvent, EventStatus, EventTime};
use crate::recurrence::to_rrule;

/// Generate a VCALENDAR with one VEVENT per event
pub fn to_ics(events: &[CalendarEvent]) -> String {
    let mut cal = Calendar::new();

    for event in events {
        cal.push(to_vevent(event));
    }

    let cal = cal.done();
    strip_ics_bloat(&cal.to_string())
}

fn to_vevent(event: &CalendarEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.id);
    ics_event.summary(&event.summary);

    ics_event.add_property("DTSTAMP", event.updated_at.format(ICS_DATETIME_UTC).to_string());
    ics_event.add_property("CREATED", event.created_at.format(ICS_DATETIME_UTC).to_string());
    ics_event.add_property(
        "LAST-MODIFIED",
        event.updated_at.format(ICS_DATETIME_UTC).to_string(),
    );

    add_datetime_property(&mut ics_event, "DTSTART", &event.start);
    add_datetime_property(&mut ics_event, "DTEND", &event.end);

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    // CONFIRMED is implied
    match event.status {
        EventStatus::Confirmed => {}
        EventStatus::Tentative => {
            ics_event.add_property("STATUS", "TENTATIVE");
        }
        EventStatus::Cancelled => {
            ics_event.add_property("STATUS", "CANCELLED");
        }
    }

    ics_event.add_property("CATEGORIES", event.category.as_str());
    ics_event.add_property("PRIORITY", priority_to_ics(event.priority).to_string());

    if let Some(rrule) = event.recurrence.as_ref().and_then(to_rrule) {
        ics_event.add_property("RRULE", &rrule);
    }

    if let Some(ref parent) = event.parent_event_id {
        ics_event.add_property("RELATED-TO", parent);
    }

    if event.completed {
        ics_event.add_property(PROP_COMPLETED, "TRUE");
    }
    if event.ai_suggested {
        ics_event.add_property(PROP_AI_SUGGESTED, "TRUE");
    }
    if !event.created_by.is_empty() {
        ics_event.add_property(PROP_CREATED_BY, &event.created_by);
    }

    for reminder in &event.reminders {
        let trigger = Trigger::before_start(chrono::Duration::minutes(i64::from(
            reminder.minutes_before,
        )));
        let mut alarm = Alarm::display("Reminder", trigger);
        alarm.add_property(PROP_REMINDER_TYPE, reminder.kind.as_str());
        if reminder.sent {
            alarm.add_property(PROP_REMINDER_SENT, "TRUE");
        }
        ics_event.alarm(alarm);
    }

    ics_event.done()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Remove DTSTAMP and UID inside VALARM sections (not required by RFC 5545)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_valarm = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if line == "BEGIN:VALARM" {
            in_valarm = true;
        } else if line == "END:VALARM" {
            in_valarm = false;
        }

        if in_valarm && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// UTC times get a Z suffix, everything else a TZID parameter with local time
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    if time.timezone == Tz::UTC {
        ics_event.add_property(name, time.at.format(ICS_DATETIME_UTC).to_string());
    } else {
        let mut prop = Property::new(name, time.local().format(ICS_DATETIME_LOCAL).to_string());
        prop.add_parameter("TZID", time.timezone.name());
        ics_event.append_property(prop);
    }
}
