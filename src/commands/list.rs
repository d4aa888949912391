use anyhow::Result;
use careercal_core::filter::{EventFilter, SortKey, filter_events, sort_events};
use careercal_core::repository::EventRepository;
use careercal_core::settings::Settings;
use careercal_core::{Category, DateRange, Priority};
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;

use super::expand_all;
use crate::render::{pluralize, print_agenda};
use crate::store::JsonEventStore;

/// Number of days shown when no range is given
const DEFAULT_DAYS: i64 = 14;

pub struct ListArgs {
    pub from: Option<String>,
    pub to: Option<String>,
    pub categories: Vec<Category>,
    pub priorities: Vec<Priority>,
    pub search: Option<String>,
    pub show_completed: bool,
    pub show_cancelled: bool,
    pub ai_suggested_only: bool,
    pub sort: SortKey,
    pub json: bool,
}

pub fn run(settings: &Settings, args: ListArgs) -> Result<()> {
    let tz = settings.timezone;
    let range = if args.from.is_none() && args.to.is_none() {
        let today = Utc::now().with_timezone(&tz).date_naive();
        let from = today.format("%Y-%m-%d").to_string();
        let to = (today + Duration::days(DEFAULT_DAYS)).format("%Y-%m-%d").to_string();
        DateRange::from_args(Some(from.as_str()), Some(to.as_str()), tz)?
    } else {
        DateRange::from_args(args.from.as_deref(), args.to.as_deref(), tz)?
    };

    let filter = EventFilter {
        categories: args.categories.into_iter().collect(),
        priorities: args.priorities.into_iter().collect(),
        date_range: range,
        search_query: args.search,
        show_completed: args.show_completed,
        show_cancelled: args.show_cancelled,
        ai_suggested_only: args.ai_suggested_only,
        ..Default::default()
    };

    let store = JsonEventStore::open(settings.events_path())?;
    let events = expand_all(&store.list()?, &filter.date_range, settings.max_instances)?;

    let mut matching = filter_events(&events, &filter);
    sort_events(&mut matching, args.sort);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matching)?);
        return Ok(());
    }

    let today = Utc::now().with_timezone(&tz).date_naive();
    print_agenda(&matching, tz, today);

    if !matching.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} {}", matching.len(), pluralize("event", matching.len())).dimmed()
        );
    }

    Ok(())
}
