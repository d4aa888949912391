use anyhow::Result;
use careercal_core::recurrence::{format_recurrence_text, parse_rrule, to_rrule};
use owo_colors::OwoColorize;

pub fn run(rrule: &str) -> Result<()> {
    let pattern = parse_rrule(rrule)?;

    println!("{}", format_recurrence_text(&pattern));
    if let Some(normalized) = to_rrule(&pattern) {
        println!("{}", normalized.dimmed());
    }

    Ok(())
}
