//! Time-overlap detection.
//!
//! Intervals are half-open: an event ending at 11:00 does not conflict with
//! one starting at 11:00.

use chrono::{DateTime, Utc};

use crate::error::{CalResult, CalendarError};
use crate::event::CalendarEvent;

/// A validated `[start, end)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CalResult<Self> {
        if end < start {
            return Err(CalendarError::InvalidTimeRange(format!(
                "span ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(TimeSpan { start, end })
    }

    pub fn of(event: &CalendarEvent) -> Self {
        // CalendarEvent::new already enforces end >= start
        TimeSpan {
            start: event.start.at,
            end: event.end.at.max(event.start.at),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Non-cancelled events overlapping `candidate`, in their original order.
pub fn find_conflicts<'a>(
    candidate: &TimeSpan,
    existing: &'a [CalendarEvent],
) -> Vec<&'a CalendarEvent> {
    existing
        .iter()
        .filter(|event| !event.is_cancelled())
        .filter(|event| candidate.overlaps(&TimeSpan::of(event)))
        .collect()
}

pub fn has_conflict(candidate: &TimeSpan, existing: &[CalendarEvent]) -> bool {
    !find_conflicts(candidate, existing).is_empty()
}

/// Conflicts for an event being edited, ignoring the event itself and any
/// instances generated from it.
pub fn find_conflicts_excluding<'a>(
    event: &CalendarEvent,
    existing: &'a [CalendarEvent],
) -> Vec<&'a CalendarEvent> {
    find_conflicts(&TimeSpan::of(event), existing)
        .into_iter()
        .filter(|other| other.id != event.id && other.parent_event_id.as_ref() != Some(&event.id))
        .collect()
}
