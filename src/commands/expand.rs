use anyhow::Result;
use careercal_core::recurrence::{format_recurrence_text, generate_instances};
use careercal_core::settings::Settings;
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize, print_agenda};
use crate::store::JsonEventStore;

pub fn run(settings: &Settings, id: &str, max: usize) -> Result<()> {
    let store = JsonEventStore::open(settings.events_path())?;
    let event = store.resolve(id)?;

    let Some(pattern) = event.recurrence.as_ref().filter(|_| event.is_recurring()) else {
        println!("{}", event.render());
        println!("{}", "Does not repeat".dimmed());
        return Ok(());
    };

    println!("{}", event.render());
    println!("  {}", format_recurrence_text(pattern).dimmed());
    println!();

    let expanded = generate_instances(&event, pattern, max)?;
    let refs: Vec<_> = expanded.iter().collect();
    let today = Utc::now().with_timezone(&settings.timezone).date_naive();
    print_agenda(&refs, settings.timezone, today);

    println!();
    println!(
        "{}",
        format!("{} {}", expanded.len(), pluralize("instance", expanded.len())).dimmed()
    );

    Ok(())
}
