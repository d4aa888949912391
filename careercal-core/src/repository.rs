//! Persistence boundary.
//!
//! The engine only hands `CalendarEvent` values across this trait. Storage
//! backends (the CLI's JSON file, a document store) implement it.

use std::collections::BTreeMap;

use crate::error::{CalResult, CalendarError};
use crate::event::CalendarEvent;

pub trait EventRepository {
    /// Store a new event. Fails if the id is taken.
    fn create(&mut self, event: CalendarEvent) -> CalResult<()>;

    fn get(&self, id: &str) -> CalResult<Option<CalendarEvent>>;

    /// Replace an existing event. Fails if it doesn't exist.
    fn update(&mut self, event: CalendarEvent) -> CalResult<()>;

    /// Remove an event and return it. Fails if it doesn't exist.
    fn delete(&mut self, id: &str) -> CalResult<CalendarEvent>;

    /// All events, ordered by id
    fn list(&self) -> CalResult<Vec<CalendarEvent>>;
}

/// Repository kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: BTreeMap<String, CalendarEvent>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<CalendarEvent> for InMemoryEventRepository {
    /// Later events replace earlier ones with the same id.
    fn from_iter<I: IntoIterator<Item = CalendarEvent>>(iter: I) -> Self {
        InMemoryEventRepository {
            events: iter.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }
}

impl EventRepository for InMemoryEventRepository {
    fn create(&mut self, event: CalendarEvent) -> CalResult<()> {
        if self.events.contains_key(&event.id) {
            return Err(CalendarError::AlreadyExists(event.id));
        }
        self.events.insert(event.id.clone(), event);
        Ok(())
    }

    fn get(&self, id: &str) -> CalResult<Option<CalendarEvent>> {
        Ok(self.events.get(id).cloned())
    }

    fn update(&mut self, event: CalendarEvent) -> CalResult<()> {
        match self.events.get_mut(&event.id) {
            Some(existing) => {
                *existing = event;
                Ok(())
            }
            None => Err(CalendarError::NotFound(event.id)),
        }
    }

    fn delete(&mut self, id: &str) -> CalResult<CalendarEvent> {
        self.events
            .remove(id)
            .ok_or_else(|| CalendarError::NotFound(id.to_string()))
    }

    fn list(&self) -> CalResult<Vec<CalendarEvent>> {
        Ok(self.events.values().cloned().collect())
    }
}
