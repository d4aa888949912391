use anyhow::Result;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::JsonEventStore;

pub fn run(settings: &Settings, id: &str, completed: bool) -> Result<()> {
    let mut store = JsonEventStore::open(settings.events_path())?;
    let mut event = store.resolve(id)?;

    if event.completed == completed {
        println!("{}", event.render());
        return Ok(());
    }

    event.completed = completed;
    event.updated_at = Utc::now();
    store.update(event.clone())?;
    store.save()?;

    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{} {}", verb.green(), event.render());
    Ok(())
}
