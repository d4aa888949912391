//! Terminal rendering for careercal-core types.
//!
//! Extension traits that add colored output using owo_colors.

use careercal_core::conflict::TimeSpan;
use careercal_core::reminder::DueReminder;
use careercal_core::stats::CalendarStats;
use careercal_core::{CalendarEvent, Category, EventStatus, Priority};
use chrono::NaiveDate;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Category {
    fn render(&self) -> String {
        let label = format!("[{}]", self);
        match self {
            Category::Interview => label.magenta().to_string(),
            Category::Deadline => label.red().to_string(),
            Category::Learning => label.blue().to_string(),
            Category::Networking => label.cyan().to_string(),
            Category::Career | Category::Project => label.green().to_string(),
            Category::Meeting | Category::Task | Category::Personal => label.dimmed().to_string(),
        }
    }
}

impl Render for Priority {
    fn render(&self) -> String {
        match self {
            Priority::High => "!".red().bold().to_string(),
            Priority::Medium => " ".to_string(),
            Priority::Low => "·".dimmed().to_string(),
        }
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let summary = if self.is_cancelled() {
            self.summary.strikethrough().dimmed().to_string()
        } else if self.completed {
            format!("{} {}", "✓".green(), self.summary.dimmed())
        } else if self.status == EventStatus::Tentative {
            format!("{}?", self.summary)
        } else {
            self.summary.clone()
        };

        let mut line = format!(
            "{} {} {} {}",
            self.priority.render(),
            summary,
            self.category.render(),
            short_id(&self.id).dimmed()
        );
        if self.ai_suggested {
            line.push_str(&format!(" {}", "ai".yellow()));
        }
        if let Some(ref location) = self.location {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        line
    }
}

impl Render for DueReminder {
    fn render(&self) -> String {
        format!(
            "{} {} starts {}",
            "⏰".yellow(),
            self.summary.bold(),
            self.event_start.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

impl Render for TimeSpan {
    fn render(&self) -> String {
        format!("{} – {}", self.start().format("%Y-%m-%d %H:%M"), self.end().format("%H:%M"))
    }
}

impl Render for CalendarStats {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("{}", "Overview".bold()),
            format!("  Total:          {}", self.total_events),
            format!("  Upcoming:       {}", self.upcoming_events),
            format!("  Today:          {}", self.today_events),
            format!("  This week:      {}", self.this_week_events),
            format!("  Overdue:        {}", render_overdue(self.overdue_events)),
            String::new(),
            format!("{}", "Progress".bold()),
            format!(
                "  Completed:      {} ({}%)",
                self.completed_events, self.completion_rate
            ),
            format!(
                "  Streak:         {} {} (longest {})",
                self.current_streak,
                pluralize("day", self.current_streak as usize),
                self.longest_streak
            ),
            format!("  Per day:        {:.1}", self.average_events_per_day),
            format!("  Score:          {}", render_score(self.productivity_score)),
        ];

        if !self.events_by_category.is_empty() {
            lines.push(String::new());
            lines.push(format!("{}", "By category".bold()));
            for (category, count) in &self.events_by_category {
                lines.push(format!("  {:<14}  {}", category.render(), count));
            }
        }

        lines.join("\n")
    }
}

fn render_overdue(count: usize) -> String {
    if count == 0 {
        count.green().to_string()
    } else {
        count.red().to_string()
    }
}

fn render_score(score: u32) -> String {
    let text = format!("{}/100", score);
    match score {
        70.. => text.green().bold().to_string(),
        40..=69 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// First segment of a uuid, or the whole id if it is short
pub fn short_id(id: &str) -> &str {
    match id.split_once('-') {
        Some((head, _)) if head.len() >= 8 && !id.contains("-instance-") => head,
        _ => id,
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Start and end time of an event in `tz`, e.g. "  09:00–10:00"
pub fn format_time_range(event: &CalendarEvent, tz: Tz) -> String {
    let start = event.start.at.with_timezone(&tz);
    let end = event.end.at.with_timezone(&tz);
    format!("{:>7}–{}", start.format("%H:%M"), end.format("%H:%M"))
}

/// Print events grouped by local day, in the order given
pub fn print_agenda(events: &[&CalendarEvent], tz: Tz, today: NaiveDate) {
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return;
    }

    let mut current_date: Option<NaiveDate> = None;

    for event in events {
        let date = event.start.at.with_timezone(&tz).date_naive();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        println!("{} {}", format_time_range(event, tz), event.render());
    }
}
