//! Recurrence patterns and their expansion.
//!
//! - `RecurrencePattern` describes how a template event repeats
//! - `engine` expands a template into concrete instances
//! - `rrule` converts patterns to and from the compact RRULE text form
//! - `describe` renders a pattern as a human-readable phrase

mod describe;
mod engine;
mod rrule;

pub use describe::format_recurrence_text;
pub use engine::{
    Instances, RANGE_SCAN_LIMIT, expand_in_range, generate_instances, instances, next_date,
};
pub use rrule::{parse_rrule, to_rrule};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalResult, CalendarError};

/// Instance cap applied when the caller doesn't pass one.
pub const DEFAULT_MAX_INSTANCES: usize = 52;

/// Short weekday names indexed by `num_days_from_sunday`.
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Frequency::None),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(CalendarError::UnknownVariant {
                kind: "frequency",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_interval() -> u32 {
    1
}

/// How a template event repeats.
///
/// `days_of_week` holds weekday indices (0 = Sunday … 6 = Saturday) and only
/// applies to weekly patterns; `day_of_month` only applies to monthly ones.
/// When both `end_date` and `occurrences` are absent, generation stops at the
/// instance cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<BTreeSet<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl Default for RecurrencePattern {
    fn default() -> Self {
        RecurrencePattern {
            frequency: Frequency::None,
            interval: 1,
            days_of_week: None,
            day_of_month: None,
            end_date: None,
            occurrences: None,
        }
    }
}

impl RecurrencePattern {
    pub fn new(frequency: Frequency) -> Self {
        RecurrencePattern {
            frequency,
            ..Default::default()
        }
    }

    pub fn none() -> Self {
        Self::new(Frequency::None)
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn on_weekdays(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days_of_week = Some(days.into_iter().collect());
        self
    }

    pub fn on_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn times(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    /// Check field combinations before the pattern reaches the generator.
    pub fn validate(&self) -> CalResult<()> {
        if self.interval == 0 {
            return Err(CalendarError::InvalidPattern(
                "interval must be at least 1".into(),
            ));
        }

        if let Some(days) = &self.days_of_week {
            if self.frequency != Frequency::Weekly {
                return Err(CalendarError::InvalidPattern(format!(
                    "daysOfWeek only applies to weekly patterns, not {}",
                    self.frequency
                )));
            }
            if days.is_empty() {
                return Err(CalendarError::InvalidPattern(
                    "daysOfWeek must not be empty when set".into(),
                ));
            }
            if let Some(bad) = days.iter().find(|d| **d > 6) {
                return Err(CalendarError::InvalidPattern(format!(
                    "weekday index {} is outside 0-6",
                    bad
                )));
            }
        }

        if let Some(day) = self.day_of_month {
            if self.frequency != Frequency::Monthly {
                return Err(CalendarError::InvalidPattern(format!(
                    "dayOfMonth only applies to monthly patterns, not {}",
                    self.frequency
                )));
            }
            if !(1..=31).contains(&day) {
                return Err(CalendarError::InvalidPattern(format!(
                    "dayOfMonth {} is outside 1-31",
                    day
                )));
            }
        }

        if self.occurrences == Some(0) {
            return Err(CalendarError::InvalidPattern(
                "occurrences must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
