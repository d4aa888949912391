use anyhow::Result;
use careercal_core::CalendarEvent;
use careercal_core::conflict::{TimeSpan, find_conflicts};
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;

use super::{apply_duration, expand_window, find_clashes, parse_start};
use crate::render::{Render, format_time_range};
use crate::store::JsonEventStore;

/// Check a free-standing slot against stored events.
pub fn run_for_slot(settings: &Settings, start: &str, duration: &str) -> Result<()> {
    let start = parse_start(start, settings.timezone)?;
    let end = apply_duration(&start, duration)?;
    let span = TimeSpan::new(start.at, end.at)?;

    let store = JsonEventStore::open(settings.events_path())?;
    let events = expand_window(&store.list()?, span.start(), span.end())?;

    print_conflicts(settings, &span.render(), &find_conflicts(&span, &events));
    Ok(())
}

/// Check a stored event (every instance, if it repeats) against the others.
pub fn run_for_event(settings: &Settings, id: &str) -> Result<()> {
    let store = JsonEventStore::open(settings.events_path())?;
    let event = store.resolve(id)?;

    let clashes = find_clashes(&event, &store.list()?, settings.max_instances)?;
    let clashes: Vec<&CalendarEvent> = clashes.iter().collect();

    print_conflicts(settings, &event.summary, &clashes);
    Ok(())
}

fn print_conflicts(settings: &Settings, label: &str, conflicts: &[&CalendarEvent]) {
    if conflicts.is_empty() {
        println!("{} {}", "No conflicts for".green(), label);
        return;
    }

    println!("{} {}", "Conflicts for".yellow(), label.bold());
    for event in conflicts {
        println!(
            "  {} {} {}",
            event.start.at.with_timezone(&settings.timezone).format("%a %b %-d"),
            format_time_range(event, settings.timezone),
            event.render()
        );
    }
}
