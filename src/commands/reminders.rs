use anyhow::Result;
use careercal_core::error::CalResult;
use careercal_core::reminder::{DueReminder, ReminderChannel, dispatch_due, due_reminders};
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize};
use crate::store::JsonEventStore;

/// Prints reminders to the terminal
struct TerminalChannel;

impl ReminderChannel for TerminalChannel {
    fn deliver(&mut self, reminder: &DueReminder) -> CalResult<()> {
        println!("{}", reminder.render());
        Ok(())
    }
}

pub fn run(settings: &Settings, dry_run: bool) -> Result<()> {
    let mut store = JsonEventStore::open(settings.events_path())?;
    let mut events = store.list()?;
    let now = Utc::now();

    if dry_run {
        let due = due_reminders(&events, now, settings.reminder_grace());
        if due.is_empty() {
            println!("{}", "No reminders due".dimmed());
        }
        for reminder in &due {
            println!("{}", reminder.render());
        }
        return Ok(());
    }

    let report = dispatch_due(&mut events, now, settings.reminder_grace(), &mut TerminalChannel);
    if report.delivered == 0 && report.failed == 0 {
        println!("{}", "No reminders due".dimmed());
        return Ok(());
    }

    for event in events {
        store.update(event)?;
    }
    store.save()?;

    if report.failed > 0 {
        anyhow::bail!(
            "{} {} could not be delivered",
            report.failed,
            pluralize("reminder", report.failed)
        );
    }

    Ok(())
}
