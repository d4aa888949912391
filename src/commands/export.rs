use std::path::Path;

use anyhow::{Context, Result};
use careercal_core::ics::to_ics;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;

use crate::render::pluralize;
use crate::store::JsonEventStore;

pub fn run(settings: &Settings, output: Option<&Path>) -> Result<()> {
    let store = JsonEventStore::open(settings.events_path())?;
    let events = store.list()?;
    let ics = to_ics(&events);

    match output {
        Some(path) => {
            std::fs::write(path, ics)
                .with_context(|| format!("Could not write {}", path.display()))?;
            println!(
                "{} {} {} to {}",
                "Exported".green(),
                events.len(),
                pluralize("event", events.len()),
                path.display()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}
