//! Human-readable recurrence descriptions.

use crate::recurrence::{Frequency, RecurrencePattern, WEEKDAY_NAMES};

/// Describe a pattern, e.g. "Every 2 weeks on Mon, Wed, until 12/31/2025".
///
/// Clauses always come in the same order: frequency/interval, days, end.
pub fn format_recurrence_text(pattern: &RecurrencePattern) -> String {
    let unit = match pattern.frequency {
        Frequency::None => return "Does not repeat".to_string(),
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        Frequency::Yearly => "year",
    };

    let mut text = if pattern.interval <= 1 {
        match pattern.frequency {
            Frequency::Daily => "Daily".to_string(),
            Frequency::Weekly => "Weekly".to_string(),
            Frequency::Monthly => "Monthly".to_string(),
            _ => "Yearly".to_string(),
        }
    } else {
        format!("Every {} {}s", pattern.interval, unit)
    };

    if let Some(days) = pattern.days_of_week.as_ref().filter(|d| !d.is_empty()) {
        let names: Vec<&str> = days
            .iter()
            .filter_map(|d| WEEKDAY_NAMES.get(usize::from(*d)).copied())
            .collect();
        text.push_str(&format!(" on {}", names.join(", ")));
    } else if let Some(day) = pattern.day_of_month {
        text.push_str(&format!(" on day {}", day));
    }

    if let Some(end) = pattern.end_date {
        text.push_str(&format!(", until {}", end.format("%m/%d/%Y")));
    } else if let Some(count) = pattern.occurrences {
        let noun = if count == 1 { "time" } else { "times" };
        text.push_str(&format!(", {} {}", count, noun));
    }

    text
}
