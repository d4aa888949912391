//! Event storage backed by a single JSON file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use careercal_core::CalendarEvent;
use careercal_core::error::CalResult;
use careercal_core::repository::{EventRepository, InMemoryEventRepository};
use tracing::debug;

/// Loads the whole event set on open and rewrites the file on `save`.
pub struct JsonEventStore {
    path: PathBuf,
    events: InMemoryEventRepository,
}

impl JsonEventStore {
    /// Open the store, starting empty if the file doesn't exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let events = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            let events: Vec<CalendarEvent> = serde_json::from_str(&content)
                .with_context(|| format!("Could not parse {}", path.display()))?;
            debug!(path = %path.display(), count = events.len(), "Loaded events");
            events.into_iter().collect()
        } else {
            InMemoryEventRepository::new()
        };

        Ok(JsonEventStore { path, events })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }

        let events = self.events.list()?;
        let content = serde_json::to_string_pretty(&events)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Could not write {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = events.len(), "Saved events");
        Ok(())
    }

    /// Find an event by exact id, or by a unique id prefix.
    pub fn resolve(&self, id: &str) -> Result<CalendarEvent> {
        if let Some(event) = self.events.get(id)? {
            return Ok(event);
        }

        let mut matches = self.events.list()?.into_iter().filter(|e| e.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(event), None) => Ok(event),
            (Some(_), Some(_)) => anyhow::bail!("Event id '{}' is ambiguous", id),
            (None, _) => anyhow::bail!("No event with id '{}'", id),
        }
    }
}

impl EventRepository for JsonEventStore {
    fn create(&mut self, event: CalendarEvent) -> CalResult<()> {
        self.events.create(event)
    }

    fn get(&self, id: &str) -> CalResult<Option<CalendarEvent>> {
        self.events.get(id)
    }

    fn update(&mut self, event: CalendarEvent) -> CalResult<()> {
        self.events.update(event)
    }

    fn delete(&mut self, id: &str) -> CalResult<CalendarEvent> {
        self.events.delete(id)
    }

    fn list(&self) -> CalResult<Vec<CalendarEvent>> {
        self.events.list()
    }
}
