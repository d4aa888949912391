use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use careercal_core::SystemClock;
use careercal_core::draft::{DraftOutcome, EventDraft, convert_draft};
use careercal_core::recurrence::format_recurrence_text;
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::JsonEventStore;

pub fn run(settings: &Settings, path: &Path) -> Result<()> {
    let draft = read_draft(path)?;
    let clock = SystemClock::new(settings.timezone);

    match convert_draft(draft, &settings.draft_options("draft"), &clock) {
        DraftOutcome::Accepted {
            event,
            recurrence_error,
        } => {
            if let Some(error) = recurrence_error {
                println!("{} {}", "Ignoring repeat rule:".yellow(), error);
            }

            let mut store = JsonEventStore::open(settings.events_path())?;
            store.create(event.clone())?;
            store.save()?;

            println!("{} {}", "Created".green(), event.render());
            if let Some(ref pattern) = event.recurrence {
                println!("  {}", format_recurrence_text(pattern).dimmed());
            }
            Ok(())
        }
        DraftOutcome::Rejected { ambiguities } => {
            println!("{}", "Draft needs clarification:".yellow());
            for ambiguity in &ambiguities {
                println!("  - {}", ambiguity);
            }
            anyhow::bail!("Draft was not converted into an event")
        }
    }
}

fn read_draft(path: &Path) -> Result<EventDraft> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read draft from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?
    };

    parse_draft(&content)
}

fn parse_draft(content: &str) -> Result<EventDraft> {
    serde_json::from_str(content).context("Draft is not valid JSON")
}
