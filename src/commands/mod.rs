pub mod add;
pub mod config;
pub mod conflicts;
pub mod delete;
pub mod describe;
pub mod done;
pub mod draft;
pub mod expand;
pub mod export;
pub mod import;
pub mod list;
pub mod reminders;
pub mod stats;

use anyhow::{Context, Result};
use careercal_core::conflict::find_conflicts_excluding;
use careercal_core::recurrence::{RANGE_SCAN_LIMIT, expand_in_range, generate_instances};
use careercal_core::{CalendarEvent, DateRange, EventTime};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Replace recurring templates by their instances inside `range`, keeping at
/// most `max_instances` per template. One-off events are kept when they start
/// inside `range`.
pub fn expand_all(
    events: &[CalendarEvent],
    range: &DateRange,
    max_instances: usize,
) -> Result<Vec<CalendarEvent>> {
    let mut expanded = Vec::with_capacity(events.len());

    for event in events {
        match event.recurrence {
            Some(ref pattern) if event.is_recurring() => {
                let instances = expand_in_range(event, pattern, range, max_instances)
                    .with_context(|| format!("Could not expand '{}'", event.summary))?;
                expanded.extend(instances);
            }
            _ if range.contains(event.start.at) => expanded.push(event.clone()),
            _ => {}
        }
    }

    Ok(expanded)
}

/// Expand recurring templates into every instance that may be running between
/// `from` and `to`. One-off events are kept as they are.
///
/// The window alone bounds the expansion: the display cap does not apply, so a
/// long-running series still has its instances around `from`.
pub fn expand_window(
    events: &[CalendarEvent],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<CalendarEvent>> {
    let mut expanded = Vec::with_capacity(events.len());

    for event in events {
        match event.recurrence {
            Some(ref pattern) if event.is_recurring() => {
                // An instance that started before `from` can still overlap it
                let range = DateRange {
                    from: Some(from - event.duration()),
                    to: Some(to),
                };
                let instances = expand_in_range(event, pattern, &range, RANGE_SCAN_LIMIT)
                    .with_context(|| format!("Could not expand '{}'", event.summary))?;
                expanded.extend(instances);
            }
            _ => expanded.push(event.clone()),
        }
    }

    Ok(expanded)
}

/// Stored events overlapping `event`, or any of its first `max_instances`
/// instances when it repeats. Each clashing event is reported once.
pub fn find_clashes(
    event: &CalendarEvent,
    stored: &[CalendarEvent],
    max_instances: usize,
) -> Result<Vec<CalendarEvent>> {
    let candidates = match event.recurrence {
        Some(ref pattern) if event.is_recurring() => {
            generate_instances(event, pattern, max_instances)?
        }
        _ => vec![event.clone()],
    };

    let (Some(first), Some(last_end)) = (
        candidates.first(),
        candidates.iter().map(|c| c.end.at).max(),
    ) else {
        return Ok(Vec::new());
    };

    let others: Vec<CalendarEvent> = stored
        .iter()
        .filter(|e| e.id != event.id)
        .cloned()
        .collect();
    let others = expand_window(&others, first.start.at, last_end)?;

    let mut clashes: Vec<CalendarEvent> = Vec::new();
    for candidate in &candidates {
        for clash in find_conflicts_excluding(candidate, &others) {
            if !clashes.iter().any(|c| c.id == clash.id) {
                clashes.push(clash.clone());
            }
        }
    }

    Ok(clashes)
}

/// Parse a local date/time like "2025-03-20T15:00" or "2025-03-20 15:00".
pub fn parse_start(input: &str, tz: Tz) -> Result<EventTime> {
    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input.trim(), fmt).ok())
        .with_context(|| {
            format!(
                "Could not parse start time: \"{}\". Expected YYYY-MM-DDTHH:MM",
                input
            )
        })?;

    Ok(EventTime::from_local(naive, tz)?)
}

/// Apply a duration string to a start time.
pub fn apply_duration(start: &EventTime, dur_input: &str) -> Result<EventTime> {
    try_apply_duration(start, dur_input)
        .with_context(|| format!("Could not parse duration: \"{}\"", dur_input))
}

fn try_apply_duration(start: &EventTime, dur_input: &str) -> Result<EventTime> {
    let std_dur = humantime::parse_duration(dur_input).map_err(|e| anyhow::anyhow!("{}", e))?;
    let chrono_dur = Duration::from_std(std_dur).context("Duration too large")?;

    Ok(EventTime::new(start.at + chrono_dur, start.timezone))
}
