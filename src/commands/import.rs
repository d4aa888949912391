use std::path::Path;

use anyhow::{Context, Result};
use careercal_core::ics::parse_ics;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::render::pluralize;
use crate::store::JsonEventStore;

/// Events whose UID is already stored are updated in place.
pub fn run(settings: &Settings, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let imported = parse_ics(&content, settings.timezone)?;

    let mut store = JsonEventStore::open(settings.events_path())?;
    let (mut created, mut updated) = (0, 0);

    for event in imported {
        if store.get(&event.id)?.is_some() {
            debug!(id = %event.id, "Updating existing event");
            store.update(event)?;
            updated += 1;
        } else {
            store.create(event)?;
            created += 1;
        }
    }
    store.save()?;

    println!(
        "{} {} new {}, {} updated",
        "Imported".green(),
        created,
        pluralize("event", created),
        updated
    );

    Ok(())
}
