//! Completion, streak and productivity analytics over an event set.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::clock::Clock;
use crate::event::{CalendarEvent, Category, EventTime, Priority};

/// Days scanned backwards from today when computing streaks.
pub const STREAK_WINDOW_DAYS: i64 = 90;
/// Days averaged over for `average_events_per_day`.
pub const CADENCE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStats {
    pub total_events: usize,
    /// Completed events among the completable ones
    pub completed_events: usize,
    pub upcoming_events: usize,
    pub overdue_events: usize,
    pub today_events: usize,
    pub this_week_events: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// 0..=100
    pub productivity_score: u32,
    pub events_by_category: BTreeMap<Category, usize>,
    pub events_by_priority: BTreeMap<Priority, usize>,
    /// Percentage, 0..=100
    pub completion_rate: u32,
    /// Rounded to one decimal
    pub average_events_per_day: f64,
}

pub fn calculate_stats(events: &[CalendarEvent], clock: &impl Clock) -> CalendarStats {
    let now = clock.now();
    let tz = clock.timezone();
    let today = clock.today();
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let week_end = week_start + Duration::days(7);

    let mut stats = CalendarStats {
        total_events: events.len(),
        completed_events: 0,
        upcoming_events: 0,
        overdue_events: 0,
        today_events: 0,
        this_week_events: 0,
        current_streak: 0,
        longest_streak: 0,
        productivity_score: 0,
        events_by_category: BTreeMap::new(),
        events_by_priority: BTreeMap::new(),
        completion_rate: 0,
        average_events_per_day: 0.0,
    };

    let cadence_start = today - Duration::days(CADENCE_WINDOW_DAYS - 1);
    let mut completable = 0usize;
    let mut recent = 0usize;
    let mut active_days = BTreeSet::new();

    for event in events {
        let cancelled = event.is_cancelled();
        let day = local_date(&event.start, tz);

        if event.start.at > now && !cancelled {
            stats.upcoming_events += 1;
        }
        if event.end.at < now && !cancelled {
            completable += 1;
            if event.completed {
                stats.completed_events += 1;
            } else {
                stats.overdue_events += 1;
            }
        }
        if day == today {
            stats.today_events += 1;
        }
        if day >= week_start && day < week_end {
            stats.this_week_events += 1;
        }
        if day >= cadence_start && event.start.at <= now {
            recent += 1;
        }

        active_days.insert(day);
        *stats.events_by_category.entry(event.category).or_insert(0) += 1;
        *stats.events_by_priority.entry(event.priority).or_insert(0) += 1;
    }

    if completable > 0 {
        stats.completion_rate =
            (stats.completed_events as f64 / completable as f64 * 100.0).round() as u32;
    }

    let (current, longest) = streaks(&active_days, today);
    stats.current_streak = current;
    stats.longest_streak = longest;

    stats.average_events_per_day =
        (recent as f64 / CADENCE_WINDOW_DAYS as f64 * 10.0).round() / 10.0;
    stats.productivity_score = productivity_score(
        stats.completion_rate,
        stats.current_streak,
        stats.upcoming_events,
        stats.average_events_per_day,
    );

    stats
}

/// Weighted composite of completion rate, streak, upcoming load and cadence.
/// Each bounded term contributes at most 20 points, completion at most 40.
pub fn productivity_score(
    completion_rate: u32,
    current_streak: u32,
    upcoming_events: usize,
    average_events_per_day: f64,
) -> u32 {
    let score = f64::from(completion_rate) * 0.4
        + (f64::from(current_streak) * 5.0).min(20.0)
        + (upcoming_events as f64 / 10.0 * 20.0).min(20.0)
        + (average_events_per_day / 3.0 * 20.0).min(20.0);

    score.round().clamp(0.0, 100.0) as u32
}

fn local_date(time: &EventTime, tz: Tz) -> NaiveDate {
    time.at.with_timezone(&tz).date_naive()
}

/// (current, longest) runs of active days in the window ending `today`.
fn streaks(active_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> (u32, u32) {
    let mut current = 0;
    let mut still_current = true;
    let mut run = 0;
    let mut longest = 0;

    for offset in 0..STREAK_WINDOW_DAYS {
        let day = today - Duration::days(offset);
        if active_days.contains(&day) {
            run += 1;
            longest = longest.max(run);
            if still_current {
                current += 1;
            }
        } else {
            run = 0;
            still_current = false;
        }
    }

    (current, longest)
}
