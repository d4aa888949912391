use anyhow::Result;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::JsonEventStore;

pub fn run(settings: &Settings, id: &str) -> Result<()> {
    let mut store = JsonEventStore::open(settings.events_path())?;
    let event = store.resolve(id)?;

    let deleted = store.delete(&event.id)?;
    store.save()?;

    println!("{} {}", "Deleted".red(), deleted.render());
    Ok(())
}
