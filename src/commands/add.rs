use anyhow::Result;
use careercal_core::recurrence::{format_recurrence_text, parse_rrule};
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use careercal_core::{CalendarEvent, Category, Priority, Reminder, ReminderKind};
use chrono::Utc;
use owo_colors::OwoColorize;
use tracing::debug;

use super::{apply_duration, find_clashes, parse_start};
use crate::render::{Render, format_time_range};
use crate::store::JsonEventStore;

/// Command-line input for a new event
pub struct NewEvent {
    pub title: String,
    pub start: String,
    pub duration: String,
    pub category: Category,
    pub priority: Priority,
    pub location: Option<String>,
    pub description: Option<String>,
    pub repeat: Option<String>,
    pub reminders: Vec<u32>,
}

pub fn run(settings: &Settings, input: NewEvent, force: bool) -> Result<()> {
    let event = build_event(settings, input)?;

    let mut store = JsonEventStore::open(settings.events_path())?;
    let existing = store.list()?;

    if !force {
        let clashes = find_clashes(&event, &existing, settings.max_instances)?;

        if !clashes.is_empty() {
            println!("{}", "Overlaps with:".yellow());
            for clash in &clashes {
                println!(
                    "  {} {} {}",
                    clash.start.at.with_timezone(&settings.timezone).format("%a %b %-d"),
                    format_time_range(clash, settings.timezone),
                    clash.render()
                );
            }
            anyhow::bail!("Event not created. Use --force to create it anyway.");
        }
    }

    debug!(id = %event.id, "Creating event");
    store.create(event.clone())?;
    store.save()?;

    println!("{} {}", "Created".green(), event.render());
    if let Some(ref pattern) = event.recurrence {
        println!("  {}", format_recurrence_text(pattern).dimmed());
    }

    Ok(())
}

fn build_event(settings: &Settings, input: NewEvent) -> Result<CalendarEvent> {
    let start = parse_start(&input.start, settings.timezone)?;
    let end = apply_duration(&start, &input.duration)?;

    let mut event = CalendarEvent::new(uuid::Uuid::new_v4().to_string(), input.title, start, end)?
        .with_category(input.category)
        .with_priority(input.priority)
        .with_created(Utc::now(), "cli");

    if let Some(location) = input.location.filter(|l| !l.is_empty()) {
        event = event.with_location(location);
    }
    if let Some(description) = input.description.filter(|d| !d.is_empty()) {
        event = event.with_description(description);
    }
    if let Some(ref rule) = input.repeat {
        event = event.with_recurrence(parse_rrule(rule)?);
    }
    for minutes in input.reminders {
        event = event.with_reminder(Reminder::new(ReminderKind::Notification, minutes));
    }

    Ok(event)
}
