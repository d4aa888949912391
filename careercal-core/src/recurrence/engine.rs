//! Recurrence expansion.
//!
//! Expands a template event into individual instances. Arithmetic happens on
//! the template's wall clock (its own timezone), so the time of day survives
//! DST changes. Every expansion is bounded by an instance cap that is checked
//! before each candidate is produced.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::date_range::DateRange;
use crate::error::{CalResult, CalendarError};
use crate::event::{CalendarEvent, EventTime};
use crate::recurrence::{Frequency, RecurrencePattern};

/// Upper bound on candidates scanned by `expand_in_range`.
pub const RANGE_SCAN_LIMIT: usize = 5_000;

/// Lazy, restartable sequence of instances for one template + pattern.
///
/// Cloning an `Instances` (or calling `instances` again with the same inputs)
/// reproduces the same sequence from the current position.
#[derive(Debug, Clone)]
pub struct Instances {
    base: CalendarEvent,
    pattern: RecurrencePattern,
    duration: Duration,
    /// Day-of-month the template started on; months and years clamp to it.
    anchor: NaiveDate,
    last: Option<NaiveDateTime>,
    emitted: usize,
    limit: usize,
    done: bool,
}

impl Instances {
    fn new(base: &CalendarEvent, pattern: &RecurrencePattern, limit: usize) -> CalResult<Self> {
        pattern.validate()?;

        Ok(Instances {
            base: base.clone(),
            pattern: pattern.clone(),
            duration: base.duration(),
            anchor: base.start.local().date(),
            last: None,
            emitted: 0,
            limit,
            done: false,
        })
    }

    /// Produce the next instance, surfacing arithmetic failures instead of
    /// ending the sequence silently.
    pub fn try_next(&mut self) -> CalResult<Option<CalendarEvent>> {
        if self.done {
            return Ok(None);
        }

        // A non-repeating pattern is the template itself, exactly once.
        if self.pattern.frequency == Frequency::None {
            self.done = true;
            return Ok(Some(self.base.clone()));
        }

        if self.emitted >= self.limit {
            debug!(
                event = %self.base.id,
                limit = self.limit,
                "Recurrence expansion stopped at instance cap"
            );
            self.done = true;
            return Ok(None);
        }

        if self
            .pattern
            .occurrences
            .is_some_and(|n| self.emitted >= n as usize)
        {
            self.done = true;
            return Ok(None);
        }

        let cursor = match self.last {
            None => self.base.start.local(),
            Some(previous) => {
                let next = next_date(previous, self.anchor, &self.pattern)?;
                if !matches_day_constraint(next, &self.pattern) {
                    return Err(CalendarError::InvalidPattern(format!(
                        "advance from {} produced {}, which is outside the pattern",
                        previous, next
                    )));
                }
                next
            }
        };

        let start = self.base.start.with_local(cursor)?;

        if self.pattern.end_date.is_some_and(|end| start.at > end) {
            self.done = true;
            return Ok(None);
        }

        let instance = self.build_instance(start);
        self.emitted += 1;
        self.last = Some(cursor);

        Ok(Some(instance))
    }

    fn build_instance(&self, start: EventTime) -> CalendarEvent {
        let mut instance = self.base.clone();
        instance.id = format!("{}-instance-{}", self.base.id, self.emitted);
        instance.end = EventTime::new(start.at + self.duration, start.timezone);
        instance.start = start;
        instance.parent_event_id = Some(self.base.id.clone());
        instance.recurrence = None;
        for reminder in &mut instance.reminders {
            reminder.sent = false;
        }
        instance
    }
}

impl Iterator for Instances {
    type Item = CalendarEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(instance) => instance,
            Err(e) => {
                warn!(event = %self.base.id, "Recurrence expansion failed: {}", e);
                self.done = true;
                None
            }
        }
    }
}

/// Start a lazy expansion of `base` under `pattern`, producing at most
/// `max_instances` instances.
pub fn instances(
    base: &CalendarEvent,
    pattern: &RecurrencePattern,
    max_instances: usize,
) -> CalResult<Instances> {
    Instances::new(base, pattern, max_instances)
}

/// Expand `base` into concrete instances in ascending start order.
///
/// - `Frequency::None` returns the base event unchanged.
/// - The first instance always sits on the template's start.
/// - Generation stops at `occurrences`, past `end_date`, or at `max_instances`,
///   whichever comes first.
pub fn generate_instances(
    base: &CalendarEvent,
    pattern: &RecurrencePattern,
    max_instances: usize,
) -> CalResult<Vec<CalendarEvent>> {
    let mut iter = instances(base, pattern, max_instances)?;
    let mut events = Vec::new();

    while let Some(instance) = iter.try_next()? {
        events.push(instance);
    }

    Ok(events)
}

/// Instances whose start falls within `range`, at most `max_instances` of them.
pub fn expand_in_range(
    base: &CalendarEvent,
    pattern: &RecurrencePattern,
    range: &DateRange,
    max_instances: usize,
) -> CalResult<Vec<CalendarEvent>> {
    let mut iter = instances(base, pattern, RANGE_SCAN_LIMIT)?;
    let mut events = Vec::new();

    while events.len() < max_instances {
        let Some(instance) = iter.try_next()? else {
            break;
        };
        if range.to.is_some_and(|to| instance.start.at > to) {
            break;
        }
        if range.contains(instance.start.at) {
            events.push(instance);
        }
    }

    Ok(events)
}

/// Advance `cursor` by one step of `pattern`.
///
/// `anchor` is the template's start date; monthly and yearly steps clamp to its
/// day-of-month (or to `day_of_month` when set) so a Jan 31 series lands on
/// Feb 28/29 and returns to Mar 31.
pub fn next_date(
    cursor: NaiveDateTime,
    anchor: NaiveDate,
    pattern: &RecurrencePattern,
) -> CalResult<NaiveDateTime> {
    if pattern.interval == 0 {
        return Err(CalendarError::InvalidPattern(
            "interval must be at least 1".into(),
        ));
    }
    let interval = pattern.interval;

    match pattern.frequency {
        Frequency::None => Err(CalendarError::InvalidPattern(
            "a non-repeating pattern has no next date".into(),
        )),
        Frequency::Daily => add_days(cursor, i64::from(interval)),
        Frequency::Weekly => match &pattern.days_of_week {
            Some(days) if !days.is_empty() => {
                let today = weekday_index(cursor);
                if let Some(next) = days.range(today + 1..).next() {
                    return add_days(cursor, i64::from(next - today));
                }
                // Wrap to the first selected day, `interval` weeks on from this
                // (Sunday-started) week.
                let first = days.iter().next().copied().unwrap_or(today);
                let offset = i64::from(interval) * 7 - i64::from(today) + i64::from(first);
                add_days(cursor, offset)
            }
            _ => add_days(cursor, i64::from(interval) * 7),
        },
        Frequency::Monthly => {
            let day = pattern.day_of_month.unwrap_or_else(|| anchor.day());
            shift_months(cursor, interval, day)
        }
        Frequency::Yearly => {
            let months = interval.checked_mul(12).ok_or_else(|| overflow(cursor))?;
            shift_months(cursor, months, anchor.day())
        }
    }
}

/// Whether `cursor` satisfies the pattern's weekday / day-of-month constraint.
fn matches_day_constraint(cursor: NaiveDateTime, pattern: &RecurrencePattern) -> bool {
    match pattern.frequency {
        Frequency::Weekly => pattern
            .days_of_week
            .as_ref()
            .is_none_or(|days| days.contains(&weekday_index(cursor))),
        Frequency::Monthly => pattern.day_of_month.is_none_or(|day| {
            cursor.day() == day.min(days_in_month(cursor.year(), cursor.month()))
        }),
        _ => true,
    }
}

/// Weekday index with Sunday = 0.
pub(crate) fn weekday_index(dt: NaiveDateTime) -> u8 {
    // num_days_from_sunday is always < 7
    dt.weekday().num_days_from_sunday() as u8
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

fn add_days(cursor: NaiveDateTime, days: i64) -> CalResult<NaiveDateTime> {
    cursor
        .checked_add_signed(Duration::days(days))
        .ok_or_else(|| overflow(cursor))
}

/// Move `months` months forward, landing on `min(day, days in target month)`.
fn shift_months(cursor: NaiveDateTime, months: u32, day: u32) -> CalResult<NaiveDateTime> {
    let target = cursor
        .date()
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .ok_or_else(|| overflow(cursor))?;

    let day = day.min(days_in_month(target.year(), target.month()));
    let date = target.with_day(day).ok_or_else(|| overflow(cursor))?;

    Ok(date.and_time(cursor.time()))
}

fn overflow(cursor: NaiveDateTime) -> CalendarError {
    CalendarError::InvalidPattern(format!("date arithmetic overflowed after {}", cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Reminder, ReminderKind};
    use crate::recurrence::DEFAULT_MAX_INSTANCES;
    use chrono::{TimeZone, Utc, Weekday};

    fn make_event(start: (i32, u32, u32, u32), minutes: i64) -> CalendarEvent {
        let (y, m, d, h) = start;
        let start = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        CalendarEvent::new(
            "standup",
            "Standup",
            EventTime::utc(start),
            EventTime::utc(start + Duration::minutes(minutes)),
        )
        .unwrap()
    }

    fn dates(events: &[CalendarEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| e.start.local().format("%Y-%m-%d").to_string())
            .collect()
    }

    #[test]
    fn test_none_returns_base_unchanged() {
        let base = make_event((2025, 3, 3, 9), 60);
        let result = generate_instances(&base, &RecurrencePattern::none(), 0).unwrap();

        assert_eq!(result, vec![base]);
    }

    #[test]
    fn test_weekly_days_alternate_within_week() {
        // 2025-03-03 is a Monday
        let base = make_event((2025, 3, 3, 9), 60);
        let pattern = RecurrencePattern::weekly().on_weekdays([1, 3]).times(4);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(
            dates(&result),
            vec!["2025-03-03", "2025-03-05", "2025-03-10", "2025-03-12"]
        );
        for instance in &result {
            assert_eq!(instance.start.local().format("%H:%M").to_string(), "09:00");
            assert_eq!(instance.end.local().format("%H:%M").to_string(), "10:00");
        }
    }

    #[test]
    fn test_weekly_interval_skips_whole_weeks() {
        let base = make_event((2025, 3, 3, 9), 30);
        let pattern = RecurrencePattern::weekly()
            .every(2)
            .on_weekdays([1, 3])
            .times(4);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(
            dates(&result),
            vec!["2025-03-03", "2025-03-05", "2025-03-17", "2025-03-19"]
        );
    }

    #[test]
    fn test_weekly_first_instance_kept_off_pattern() {
        // Tuesday start with a Monday-only rule: the template itself still counts
        let base = make_event((2025, 3, 4, 9), 30);
        let pattern = RecurrencePattern::weekly().on_weekdays([1]).times(3);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(dates(&result), vec!["2025-03-04", "2025-03-10", "2025-03-17"]);
    }

    #[test]
    fn test_weekly_without_days_keeps_weekday() {
        let base = make_event((2025, 3, 6, 18), 90);
        let pattern = RecurrencePattern::weekly().times(5);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|e| e.start.local().weekday() == Weekday::Thu));
    }

    #[test]
    fn test_monthly_day_31_clamps_in_short_months() {
        let base = make_event((2025, 1, 31, 12), 60);
        let pattern = RecurrencePattern::monthly().on_day_of_month(31).times(3);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(dates(&result), vec!["2025-01-31", "2025-02-28", "2025-03-31"]);

        let leap_base = make_event((2024, 1, 31, 12), 60);
        let result = generate_instances(&leap_base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(dates(&result), vec!["2024-01-31", "2024-02-29", "2024-03-31"]);
    }

    #[test]
    fn test_monthly_without_day_uses_template_day() {
        let base = make_event((2025, 1, 30, 12), 60);
        let pattern = RecurrencePattern::monthly().times(4);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(
            dates(&result),
            vec!["2025-01-30", "2025-02-28", "2025-03-30", "2025-04-30"]
        );
    }

    #[test]
    fn test_yearly_leap_day_returns_to_29th() {
        let base = make_event((2024, 2, 29, 8), 60);
        let pattern = RecurrencePattern::yearly().times(5);

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(
            dates(&result),
            vec![
                "2024-02-29",
                "2025-02-28",
                "2026-02-28",
                "2027-02-28",
                "2028-02-29"
            ]
        );
    }

    #[test]
    fn test_unbounded_daily_stops_at_cap() {
        let base = make_event((2025, 1, 1, 7), 15);
        let pattern = RecurrencePattern::daily();

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(result.len(), DEFAULT_MAX_INSTANCES);

        let result = generate_instances(&base, &pattern, 3).unwrap();
        assert_eq!(result.len(), 3);

        assert!(generate_instances(&base, &pattern, 0).unwrap().is_empty());
    }

    #[test]
    fn test_end_date_is_inclusive_of_exact_start() {
        let base = make_event((2025, 1, 1, 7), 15);
        let pattern = RecurrencePattern::daily()
            .every(2)
            .until(Utc.with_ymd_and_hms(2025, 1, 5, 7, 0, 0).unwrap());

        let result = generate_instances(&base, &pattern, DEFAULT_MAX_INSTANCES).unwrap();

        assert_eq!(dates(&result), vec!["2025-01-01", "2025-01-03", "2025-01-05"]);
    }

    #[test]
    fn test_instances_are_ascending_with_template_duration() {
        let base = make_event((2025, 1, 1, 7), 45);
        let patterns = [
            RecurrencePattern::daily().every(3),
            RecurrencePattern::weekly().on_weekdays([0, 2, 4, 6]),
            RecurrencePattern::monthly().on_day_of_month(30),
            RecurrencePattern::yearly(),
        ];

        for pattern in patterns {
            let result = generate_instances(&base, &pattern, 30).unwrap();
            assert!(result.windows(2).all(|w| w[0].start.at < w[1].start.at));
            assert!(result.iter().all(|e| e.duration() == base.duration()));
        }
    }

    #[test]
    fn test_instance_identity_and_parent() {
        let base = make_event((2025, 3, 3, 9), 60)
            .with_recurrence(RecurrencePattern::daily())
            .with_reminder(Reminder {
                sent: true,
                ..Reminder::new(ReminderKind::Popup, 10)
            });

        let result = generate_instances(&base, &RecurrencePattern::daily().times(2), 10).unwrap();

        assert_eq!(result[0].id, "standup-instance-0");
        assert_eq!(result[1].id, "standup-instance-1");
        assert!(result.iter().all(|e| e.parent_event_id.as_deref() == Some("standup")));
        assert!(result.iter().all(|e| e.recurrence.is_none()));
        assert!(result.iter().all(|e| !e.reminders[0].sent));
        assert_eq!(result[1].summary, base.summary);
    }

    #[test]
    fn test_wall_clock_survives_dst() {
        let tz = chrono_tz::Europe::Helsinki;
        let start = NaiveDate::from_ymd_opt(2025, 3, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let start = EventTime::from_local(start, tz).unwrap();
        let end = EventTime::new(start.at + Duration::hours(1), tz);
        let base = CalendarEvent::new("class", "Class", start, end).unwrap();

        let result =
            generate_instances(&base, &RecurrencePattern::weekly().times(2), 10).unwrap();

        // Helsinki moves to summer time on 2025-03-30
        assert_eq!(result[1].start.local().format("%H:%M").to_string(), "09:00");
        assert_eq!(result[1].start.at - result[0].start.at, Duration::hours(167));
    }

    #[test]
    fn test_lazy_sequence_is_restartable() {
        let base = make_event((2025, 3, 3, 9), 60);
        let pattern = RecurrencePattern::weekly().on_weekdays([1, 3, 5]);

        let first: Vec<_> = instances(&base, &pattern, 20).unwrap().collect();
        let second: Vec<_> = instances(&base, &pattern, 20).unwrap().collect();
        let prefix: Vec<_> = instances(&base, &pattern, 20).unwrap().take(4).collect();

        assert_eq!(first, second);
        assert_eq!(prefix, first[..4].to_vec());
    }

    #[test]
    fn test_invalid_pattern_rejected_before_generation() {
        let base = make_event((2025, 3, 3, 9), 60);
        let pattern = RecurrencePattern::daily().on_day_of_month(4);

        assert!(matches!(
            generate_instances(&base, &pattern, 10),
            Err(CalendarError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_next_date_refuses_to_advance_none() {
        let cursor = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let result = next_date(cursor, cursor.date(), &RecurrencePattern::none());
        assert!(matches!(result, Err(CalendarError::InvalidPattern(_))));

        let zero = RecurrencePattern {
            interval: 0,
            ..RecurrencePattern::daily()
        };
        assert!(next_date(cursor, cursor.date(), &zero).is_err());
    }

    #[test]
    fn test_expand_in_range_filters_by_start() {
        let base = make_event((2025, 1, 1, 7), 15);
        let range = DateRange {
            from: Some(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 1, 12, 23, 59, 59).unwrap()),
        };

        let result = expand_in_range(&base, &RecurrencePattern::daily(), &range, 52).unwrap();

        assert_eq!(dates(&result), vec!["2025-01-10", "2025-01-11", "2025-01-12"]);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }
}
