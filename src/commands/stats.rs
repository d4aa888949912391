use anyhow::Result;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use careercal_core::stats::{CalendarStats, STREAK_WINDOW_DAYS, calculate_stats};
use careercal_core::{CalendarEvent, Clock, SystemClock};
use chrono::Duration;

use super::expand_window;
use crate::render::Render;
use crate::store::JsonEventStore;

/// How far ahead recurring events count as upcoming
const LOOKAHEAD_DAYS: i64 = 365;

pub fn run(settings: &Settings, json: bool) -> Result<()> {
    let clock = SystemClock::new(settings.timezone);
    let store = JsonEventStore::open(settings.events_path())?;
    let stats = collect_stats(&store.list()?, &clock)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats.render());
    }

    Ok(())
}

/// Stats over stored events, with recurring templates counted once per
/// instance from the start of the streak window up to a year ahead.
fn collect_stats(events: &[CalendarEvent], clock: &impl Clock) -> Result<CalendarStats> {
    let now = clock.now();
    let from = now - Duration::days(STREAK_WINDOW_DAYS + 1);
    let events = expand_window(events, from, now + Duration::days(LOOKAHEAD_DAYS))?;

    Ok(calculate_stats(&events, clock))
}
