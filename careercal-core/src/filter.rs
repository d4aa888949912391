//! Declarative event filters and orderings.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::CalendarError;
use crate::event::{CalendarEvent, Category, EventStatus, Priority};

/// All predicates are AND-combined. Empty sets mean no constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    pub categories: BTreeSet<Category>,
    pub priorities: BTreeSet<Priority>,
    pub statuses: Vec<EventStatus>,
    pub date_range: DateRange,
    pub search_query: Option<String>,
    pub show_completed: bool,
    pub show_cancelled: bool,
    pub ai_suggested_only: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        EventFilter {
            categories: BTreeSet::new(),
            priorities: BTreeSet::new(),
            statuses: Vec::new(),
            date_range: DateRange::default(),
            search_query: None,
            show_completed: true,
            show_cancelled: true,
            ai_suggested_only: false,
        }
    }
}

impl EventFilter {
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&event.category) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&event.priority) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&event.status) {
            return false;
        }
        if !self.date_range.contains(event.start.at) {
            return false;
        }
        if !self.show_completed && event.completed {
            return false;
        }
        if !self.show_cancelled && event.is_cancelled() {
            return false;
        }
        if self.ai_suggested_only && !event.ai_suggested {
            return false;
        }

        match self.search_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => matches_search(event, query),
            _ => true,
        }
    }
}

fn matches_search(event: &CalendarEvent, query: &str) -> bool {
    let haystack = [
        Some(event.summary.as_str()),
        event.description.as_deref(),
        event.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    haystack.contains(&query.to_lowercase())
}

pub fn filter_events<'a>(
    events: &'a [CalendarEvent],
    filter: &EventFilter,
) -> Vec<&'a CalendarEvent> {
    events.iter().filter(|e| filter.matches(e)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    StartAsc,
    StartDesc,
    /// High before medium before low
    Priority,
    /// By category name
    Category,
    /// Newest first
    Created,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::StartAsc,
        SortKey::StartDesc,
        SortKey::Priority,
        SortKey::Category,
        SortKey::Created,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::StartAsc => "start-asc",
            SortKey::StartDesc => "start-desc",
            SortKey::Priority => "priority",
            SortKey::Category => "category",
            SortKey::Created => "created",
        }
    }
}

impl FromStr for SortKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| CalendarError::UnknownVariant {
                kind: "sort key",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort in place; equal keys keep their input order.
pub fn sort_events<E: AsRef<CalendarEvent>>(events: &mut [E], key: SortKey) {
    match key {
        SortKey::StartAsc => events.sort_by_key(|e| e.as_ref().start.at),
        SortKey::StartDesc => events.sort_by(|a, b| b.as_ref().start.at.cmp(&a.as_ref().start.at)),
        SortKey::Priority => events.sort_by_key(|e| e.as_ref().priority.rank()),
        SortKey::Category => events.sort_by(|a, b| {
            a.as_ref()
                .category
                .as_str()
                .cmp(b.as_ref().category.as_str())
        }),
        SortKey::Created => {
            events.sort_by(|a, b| b.as_ref().created_at.cmp(&a.as_ref().created_at))
        }
    }
}

impl AsRef<CalendarEvent> for CalendarEvent {
    fn as_ref(&self) -> &CalendarEvent {
        self
    }
}
