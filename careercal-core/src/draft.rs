//! Conversion of language-service drafts into events.
//!
//! The upstream service turns free text like "mock interview every Tuesday at
//! 3pm" into an `EventDraft`. Drafts below the confidence threshold, or with a
//! category we don't know, are rejected with the reasons instead of guessed at.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::event::{CalendarEvent, Category, EventStatus, EventTime, Priority};
use crate::recurrence::parse_rrule;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Structured proposal returned by the language service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub category: String,
    /// RRULE text, e.g. "FREQ=WEEKLY;BYDAY=TU"
    #[serde(default)]
    pub recurrence: Option<String>,
    /// 0.0..=1.0
    pub confidence: f64,
    #[serde(default)]
    pub ambiguities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DraftOptions {
    pub confidence_threshold: f64,
    /// Timezone the event is scheduled in
    pub timezone: Tz,
    pub created_by: String,
}

impl Default for DraftOptions {
    fn default() -> Self {
        DraftOptions {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            timezone: Tz::UTC,
            created_by: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    Accepted {
        event: CalendarEvent,
        /// Why the draft's recurrence was dropped, if it was
        recurrence_error: Option<String>,
    },
    Rejected {
        ambiguities: Vec<String>,
    },
}

impl DraftOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DraftOutcome::Accepted { .. })
    }
}

pub fn convert_draft(
    draft: EventDraft,
    options: &DraftOptions,
    clock: &impl Clock,
) -> DraftOutcome {
    let mut ambiguities = draft.ambiguities;

    if draft.confidence.is_nan() || draft.confidence < options.confidence_threshold {
        debug!(
            confidence = draft.confidence,
            threshold = options.confidence_threshold,
            "Rejecting low-confidence draft"
        );
        ambiguities.push(format!(
            "Confidence {:.2} is below the threshold of {:.2}",
            draft.confidence, options.confidence_threshold
        ));
        return DraftOutcome::Rejected { ambiguities };
    }

    let category = match draft.category.parse::<Category>() {
        Ok(category) => category,
        Err(e) => {
            debug!(category = %draft.category, "Rejecting draft with unknown category");
            ambiguities.push(e.to_string());
            return DraftOutcome::Rejected { ambiguities };
        }
    };

    if draft.summary.trim().is_empty() {
        ambiguities.push("Draft has no summary".to_string());
        return DraftOutcome::Rejected { ambiguities };
    }

    let start = EventTime::new(draft.start, options.timezone);
    let end = EventTime::new(
        draft.start + Duration::minutes(i64::from(draft.duration_minutes)),
        options.timezone,
    );
    let now = clock.now();

    let mut event = match CalendarEvent::new(
        uuid::Uuid::new_v4().to_string(),
        draft.summary.trim(),
        start,
        end,
    ) {
        Ok(event) => event,
        Err(e) => {
            ambiguities.push(e.to_string());
            return DraftOutcome::Rejected { ambiguities };
        }
    }
    .with_category(category)
    .with_priority(Priority::Medium)
    .with_status(EventStatus::Confirmed)
    .with_created(now, options.created_by.clone())
    .ai_suggested(true);

    let mut recurrence_error = None;
    if let Some(text) = draft.recurrence.as_deref().filter(|t| !t.trim().is_empty()) {
        match parse_rrule(text) {
            Ok(pattern) => event.recurrence = Some(pattern),
            Err(e) => {
                debug!(rrule = text, "Dropping unusable draft recurrence: {}", e);
                recurrence_error = Some(e.to_string());
            }
        }
    }

    debug!(id = %event.id, category = %event.category, "Accepted draft");
    DraftOutcome::Accepted {
        event,
        recurrence_error,
    }
}
