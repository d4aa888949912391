//! Due-reminder computation and the delivery boundary.
//!
//! The core decides which reminders are due and keeps the `sent` flags
//! consistent. Getting a message in front of the user is a `ReminderChannel`'s job.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CalResult;
use crate::event::{CalendarEvent, ReminderKind};

pub const DEFAULT_GRACE_MINUTES: i64 = 60;

/// A reminder whose trigger time has passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReminder {
    pub event_id: String,
    pub reminder_id: String,
    pub summary: String,
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
    pub event_start: DateTime<Utc>,
}

pub trait ReminderChannel {
    fn deliver(&mut self, reminder: &DueReminder) -> CalResult<()>;
}

/// Unsent reminders with `fire_at <= now`, earliest first.
///
/// Cancelled and completed events are skipped, as are events that started more
/// than `grace` before `now`.
pub fn due_reminders(
    events: &[CalendarEvent],
    now: DateTime<Utc>,
    grace: Duration,
) -> Vec<DueReminder> {
    let mut due: Vec<DueReminder> = events
        .iter()
        .filter(|event| !event.is_cancelled() && !event.completed)
        .filter(|event| event.start.at >= now - grace)
        .flat_map(|event| {
            event
                .reminders
                .iter()
                .filter(|r| !r.sent)
                .filter(move |r| r.fire_at(event.start.at) <= now)
                .map(move |r| DueReminder {
                    event_id: event.id.clone(),
                    reminder_id: r.id.clone(),
                    summary: event.summary.clone(),
                    kind: r.kind,
                    fire_at: r.fire_at(event.start.at),
                    event_start: event.start.at,
                })
        })
        .collect();

    due.sort_by_key(|d| d.fire_at);
    due
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Deliver every due reminder and mark the delivered ones as sent.
/// Failed deliveries stay unsent so the next run retries them.
pub fn dispatch_due(
    events: &mut [CalendarEvent],
    now: DateTime<Utc>,
    grace: Duration,
    channel: &mut impl ReminderChannel,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for due in due_reminders(events, now, grace) {
        if let Err(e) = channel.deliver(&due) {
            warn!(
                event = %due.event_id,
                reminder = %due.reminder_id,
                "Reminder delivery failed: {}",
                e
            );
            report.failed += 1;
            continue;
        }

        let reminder = events
            .iter_mut()
            .filter(|e| e.id == due.event_id)
            .flat_map(|e| e.reminders.iter_mut())
            .find(|r| r.id == due.reminder_id);
        if let Some(reminder) = reminder {
            reminder.sent = true;
        }
        report.delivered += 1;
    }

    debug!(delivered = report.delivered, failed = report.failed, "Dispatched reminders");
    report
}
