//! Calendar event value types.
//!
//! These are plain values: the engine reads them, derives new ones (recurrence
//! instances, stats) and never mutates shared state. Persistence and delivery
//! happen behind the traits in `repository` and `reminder`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalResult, CalendarError};
use crate::recurrence::RecurrencePattern;

/// An instant together with the timezone the event was scheduled in.
///
/// Recurrence arithmetic happens on the wall clock of `timezone`, so a weekly
/// 09:00 meeting stays at 09:00 across DST changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    pub at: DateTime<Utc>,
    pub timezone: Tz,
}

impl EventTime {
    pub fn new(at: DateTime<Utc>, timezone: Tz) -> Self {
        EventTime { at, timezone }
    }

    pub fn utc(at: DateTime<Utc>) -> Self {
        EventTime {
            at,
            timezone: Tz::UTC,
        }
    }

    /// Resolve a wall-clock time in `timezone`.
    /// Ambiguous times (DST fall-back) take the earlier instant; times inside a
    /// DST gap are pushed forward by the gap.
    pub fn from_local(naive: NaiveDateTime, timezone: Tz) -> CalResult<Self> {
        let resolved = match timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => timezone
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .ok_or_else(|| {
                    CalendarError::InvalidTimeRange(format!(
                        "{} does not exist in {}",
                        naive, timezone
                    ))
                })?,
        };

        Ok(EventTime {
            at: resolved.with_timezone(&Utc),
            timezone,
        })
    }

    /// Wall-clock time in the event's own timezone.
    pub fn local(&self) -> NaiveDateTime {
        self.at.with_timezone(&self.timezone).naive_local()
    }

    /// Same timezone, different wall-clock time.
    pub fn with_local(&self, naive: NaiveDateTime) -> CalResult<Self> {
        Self::from_local(naive, self.timezone)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.local().format("%Y-%m-%d %H:%M"), self.timezone)
    }
}

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Interview,
    Deadline,
    Learning,
    Networking,
    Meeting,
    Task,
    Personal,
    Career,
    Project,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Interview,
        Category::Deadline,
        Category::Learning,
        Category::Networking,
        Category::Meeting,
        Category::Task,
        Category::Personal,
        Category::Career,
        Category::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Interview => "interview",
            Category::Deadline => "deadline",
            Category::Learning => "learning",
            Category::Networking => "networking",
            Category::Meeting => "meeting",
            Category::Task => "task",
            Category::Personal => "personal",
            Category::Career => "career",
            Category::Project => "project",
        }
    }
}

impl FromStr for Category {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| CalendarError::UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, most important first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(CalendarError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Ord is by importance so BTreeMap tallies list high first.
impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "confirmed",
            EventStatus::Tentative => "tentative",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(EventStatus::Confirmed),
            "tentative" => Ok(EventStatus::Tentative),
            "cancelled" | "canceled" => Ok(EventStatus::Cancelled),
            _ => Err(CalendarError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a reminder reaches the user. Delivery itself is the channel's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Popup,
    Email,
    Notification,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Popup => "popup",
            ReminderKind::Email => "email",
            ReminderKind::Notification => "notification",
        }
    }
}

impl FromStr for ReminderKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "popup" => Ok(ReminderKind::Popup),
            "email" => Ok(ReminderKind::Email),
            "notification" => Ok(ReminderKind::Notification),
            _ => Err(CalendarError::UnknownVariant {
                kind: "reminder type",
                value: s.to_string(),
            }),
        }
    }
}

/// A reminder attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    /// Minutes before the event start to trigger
    pub minutes_before: u32,
    #[serde(default)]
    pub sent: bool,
}

impl Reminder {
    pub fn new(kind: ReminderKind, minutes_before: u32) -> Self {
        Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            minutes_before,
            sent: false,
        }
    }

    /// When this reminder should fire for an event starting at `start`.
    pub fn fire_at(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start - Duration::minutes(i64::from(self.minutes_before))
    }
}

/// A calendar event (template or generated instance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub category: Category,
    pub priority: Priority,
    pub status: EventStatus,
    #[serde(default)]
    pub completed: bool,

    /// Recurrence rule for template events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrencePattern>,
    /// Set on generated instances, points at the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,

    #[serde(default)]
    pub reminders: Vec<Reminder>,
    /// Created from an AI-generated draft
    #[serde(default)]
    pub ai_suggested: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
}

impl CalendarEvent {
    /// Create a confirmed, medium-priority task event.
    /// Rejects events that end before they start.
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: EventTime,
        end: EventTime,
    ) -> CalResult<Self> {
        if end.at < start.at {
            return Err(CalendarError::InvalidTimeRange(format!(
                "end {} is before start {}",
                end, start
            )));
        }

        Ok(CalendarEvent {
            id: id.into(),
            summary: summary.into(),
            description: None,
            location: None,
            start,
            end,
            category: Category::Task,
            priority: Priority::Medium,
            status: EventStatus::Confirmed,
            completed: false,
            recurrence: None,
            parent_event_id: None,
            reminders: Vec::new(),
            ai_suggested: false,
            created_at: start.at,
            updated_at: start.at,
            created_by: String::new(),
        })
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recurrence(mut self, pattern: RecurrencePattern) -> Self {
        self.recurrence = Some(pattern);
        self
    }

    pub fn with_reminder(mut self, reminder: Reminder) -> Self {
        self.reminders.push(reminder);
        self
    }

    pub fn with_created(mut self, at: DateTime<Utc>, by: impl Into<String>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self.created_by = by.into();
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn ai_suggested(mut self, ai_suggested: bool) -> Self {
        self.ai_suggested = ai_suggested;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end.at - self.start.at
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_ref()
            .is_some_and(|r| r.frequency != crate::recurrence::Frequency::None)
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}
