//! End-to-end checks across the engine's public API.

use careercal_core::conflict::{TimeSpan, find_conflicts};
use careercal_core::draft::{DraftOptions, DraftOutcome, EventDraft, convert_draft};
use careercal_core::filter::{EventFilter, SortKey, filter_events, sort_events};
use careercal_core::ics::{parse_ics, to_ics};
use careercal_core::recurrence::{generate_instances, instances, parse_rrule, to_rrule};
use careercal_core::reminder::{DueReminder, ReminderChannel, dispatch_due};
use careercal_core::repository::{EventRepository, InMemoryEventRepository};
use careercal_core::stats::calculate_stats;
use careercal_core::{
    CalResult, CalendarEvent, Category, EventStatus, EventTime, FixedClock, RecurrencePattern,
    Reminder, ReminderKind,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn event(id: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
    CalendarEvent::new(
        id,
        id,
        EventTime::utc(start),
        EventTime::utc(start + Duration::minutes(minutes)),
    )
    .unwrap()
}

#[test_log::test]
fn test_weekly_mon_wed_four_occurrences() {
    // 2025-03-24 is a Monday
    let base = event("standup", utc(2025, 3, 24, 9, 0), 60);
    let pattern = RecurrencePattern::weekly().on_weekdays([1, 3]).times(4);

    let result = generate_instances(&base, &pattern, 52).unwrap();

    let days: Vec<NaiveDate> = result.iter().map(|e| e.start.at.date_naive()).collect();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 26).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
        ]
    );
    for instance in &result {
        assert_eq!(instance.start.at.format("%H:%M").to_string(), "09:00");
        assert_eq!(instance.end.at.format("%H:%M").to_string(), "10:00");
    }
}

#[test]
fn test_monthly_day_31_clamps_to_february() {
    for (year, feb_day) in [(2025, 28), (2024, 29)] {
        let base = event("rent", utc(year, 1, 31, 8, 0), 30);
        let pattern = RecurrencePattern::monthly().on_day_of_month(31).times(3);

        let result = generate_instances(&base, &pattern, 52).unwrap();

        let days: Vec<(u32, u32)> = result
            .iter()
            .map(|e| (e.start.at.month(), e.start.at.day()))
            .collect();
        assert_eq!(days, vec![(1, 31), (2, feb_day), (3, 31)], "year {year}");
    }
}

#[test]
fn test_completion_rate_of_five_out_of_six() {
    let now = utc(2025, 3, 20, 12, 0);
    let events: Vec<_> = (1..=6)
        .map(|i| event(&format!("e{i}"), now - Duration::days(i), 60).completed(i != 6))
        .collect();

    let stats = calculate_stats(&events, &FixedClock::utc(now));

    assert_eq!(stats.completion_rate, 83);
    assert!(stats.productivity_score <= 100);
}

#[test]
fn test_touching_and_contained_conflicts() {
    let candidate = TimeSpan::new(utc(2025, 3, 20, 10, 0), utc(2025, 3, 20, 11, 0)).unwrap();

    let touching = vec![event("after", utc(2025, 3, 20, 11, 0), 60)];
    assert!(find_conflicts(&candidate, &touching).is_empty());

    let inside = vec![event("inside", utc(2025, 3, 20, 10, 30), 15)];
    assert_eq!(find_conflicts(&candidate, &inside).len(), 1);

    let cancelled =
        vec![event("inside", utc(2025, 3, 20, 10, 30), 15).with_status(EventStatus::Cancelled)];
    assert!(find_conflicts(&candidate, &cancelled).is_empty());
}

fn sample_patterns() -> Vec<RecurrencePattern> {
    vec![
        RecurrencePattern::daily(),
        RecurrencePattern::daily().every(3).times(10),
        RecurrencePattern::weekly(),
        RecurrencePattern::weekly().on_weekdays([1, 3, 5]),
        RecurrencePattern::weekly().every(2).on_weekdays([0, 6]).times(9),
        RecurrencePattern::monthly(),
        RecurrencePattern::monthly().on_day_of_month(31).times(14),
        RecurrencePattern::monthly().every(5).on_day_of_month(15),
        RecurrencePattern::yearly().times(3),
        RecurrencePattern::weekly().until(utc(2025, 9, 1, 0, 0)),
    ]
}

#[test]
fn test_instances_ascend_and_keep_duration() {
    let base = CalendarEvent::new(
        "template",
        "Template",
        EventTime::from_local(
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().and_hms_opt(18, 30, 0).unwrap(),
            chrono_tz::America::New_York,
        )
        .unwrap(),
        EventTime::from_local(
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().and_hms_opt(20, 0, 0).unwrap(),
            chrono_tz::America::New_York,
        )
        .unwrap(),
    )
    .unwrap();

    for pattern in sample_patterns() {
        for max in [0, 1, 7, 52] {
            let result = generate_instances(&base, &pattern, max).unwrap();

            let bound = pattern.occurrences.map_or(max, |n| (n as usize).min(max));
            assert!(result.len() <= bound, "{pattern:?} max {max}");
            for pair in result.windows(2) {
                assert!(pair[0].start.at < pair[1].start.at, "{pattern:?}");
            }
            for instance in &result {
                assert_eq!(instance.duration(), base.duration());
                assert_eq!(instance.parent_event_id.as_deref(), Some("template"));
                assert_eq!(instance.start.local().time(), base.start.local().time());
            }
        }
    }
}

#[test]
fn test_weekly_instances_stay_on_selected_days() {
    // Starts on a Thursday so the first instance is off-pattern
    let base = event("gym", utc(2025, 3, 20, 6, 0), 45);
    let pattern = RecurrencePattern::weekly().on_weekdays([1, 3, 5]);

    let result = generate_instances(&base, &pattern, 52).unwrap();

    assert_eq!(result.len(), 52);
    assert_eq!(result[0].start.at.weekday(), Weekday::Thu);
    for instance in &result[1..] {
        assert!(matches!(
            instance.start.at.weekday(),
            Weekday::Mon | Weekday::Wed | Weekday::Fri
        ));
    }
}

#[test]
fn test_monthly_clamp_over_two_years() {
    let base = event("invoice", utc(2025, 1, 31, 9, 0), 30);
    let pattern = RecurrencePattern::monthly().on_day_of_month(31);

    for instance in generate_instances(&base, &pattern, 24).unwrap() {
        let date = instance.start.at.date_naive();
        let next_month = date
            .with_day(1)
            .and_then(|d| d.checked_add_months(chrono::Months::new(1)))
            .unwrap();
        let days_in_month = (next_month - Duration::days(1)).day();
        assert_eq!(date.day(), days_in_month.min(31));
    }
}

#[test]
fn test_unbounded_daily_stops_at_cap() {
    let base = event("journal", utc(2025, 3, 20, 21, 0), 15);

    assert_eq!(generate_instances(&base, &RecurrencePattern::daily(), 52).unwrap().len(), 52);
    assert_eq!(generate_instances(&base, &RecurrencePattern::daily(), 3).unwrap().len(), 3);
}

#[test]
fn test_lazy_sequence_matches_full_list() {
    let base = event("review", utc(2025, 3, 24, 16, 0), 30);
    let pattern = RecurrencePattern::weekly().every(2).on_weekdays([1, 4]);

    let full = generate_instances(&base, &pattern, 20).unwrap();
    let prefix: Vec<_> = instances(&base, &pattern, 20).unwrap().take(5).collect();
    let again: Vec<_> = instances(&base, &pattern, 20).unwrap().collect();

    assert_eq!(prefix, full[..5].to_vec());
    assert_eq!(again, full);
}

#[test]
fn test_rrule_round_trip() {
    for pattern in sample_patterns() {
        let text = to_rrule(&pattern).unwrap();
        assert_eq!(parse_rrule(&text).unwrap(), pattern, "{text}");
    }

    assert_eq!(to_rrule(&RecurrencePattern::none()), None);
}

#[test]
fn test_rrule_text_round_trip() {
    for text in [
        "FREQ=DAILY",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;COUNT=8",
        "FREQ=MONTHLY;BYMONTHDAY=15;UNTIL=20251231T235959Z",
        "FREQ=YEARLY;INTERVAL=4",
    ] {
        let pattern = parse_rrule(text).unwrap();
        assert_eq!(to_rrule(&pattern).as_deref(), Some(text));
    }
}

struct Collect(Vec<DueReminder>);

impl ReminderChannel for Collect {
    fn deliver(&mut self, reminder: &DueReminder) -> CalResult<()> {
        self.0.push(reminder.clone());
        Ok(())
    }
}

#[test_log::test]
fn test_draft_to_repository_to_reminders() {
    let now = utc(2025, 3, 24, 14, 50);
    let clock = FixedClock::new(now, Tz::UTC);
    let draft = EventDraft {
        summary: "Mock interview".to_string(),
        start: utc(2025, 3, 24, 15, 0),
        duration_minutes: 60,
        category: "interview".to_string(),
        recurrence: Some("FREQ=WEEKLY;COUNT=3".to_string()),
        confidence: 0.9,
        ambiguities: Vec::new(),
    };

    let DraftOutcome::Accepted { event: template, .. } =
        convert_draft(draft, &DraftOptions::default(), &clock)
    else {
        panic!("draft should be accepted");
    };
    let template = template.with_reminder(Reminder::new(ReminderKind::Popup, 15));

    let pattern = template.recurrence.clone().unwrap();
    let mut repo = InMemoryEventRepository::new();
    for instance in generate_instances(&template, &pattern, 52).unwrap() {
        repo.create(instance).unwrap();
    }

    let mut events = repo.list().unwrap();
    sort_events(&mut events, SortKey::StartAsc);
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.ai_suggested && e.category == Category::Interview));

    let mut channel = Collect(Vec::new());
    let report = dispatch_due(&mut events, now, Duration::minutes(60), &mut channel);
    assert_eq!(report.delivered, 1);
    assert_eq!(channel.0[0].event_id, events[0].id);
    assert!(events[0].reminders[0].sent);
    assert!(!events[1].reminders[0].sent);

    for event in events {
        repo.update(event).unwrap();
    }
    let filter = EventFilter {
        ai_suggested_only: true,
        ..Default::default()
    };
    let stored = repo.list().unwrap();
    assert_eq!(filter_events(&stored, &filter).len(), 3);
}

#[test]
fn test_ics_export_import_keeps_schedule() {
    let template = event("course", utc(2025, 4, 1, 17, 0), 90)
        .with_category(Category::Learning)
        .with_recurrence(RecurrencePattern::weekly().on_weekdays([2, 4]).times(6));

    let imported = parse_ics(&to_ics(std::slice::from_ref(&template)), Tz::UTC).unwrap();
    let back = &imported[0];

    assert_eq!(back.category, Category::Learning);
    let pattern = template.recurrence.as_ref().unwrap();
    let original = generate_instances(&template, pattern, 52).unwrap();
    let reimported = generate_instances(back, back.recurrence.as_ref().unwrap(), 52).unwrap();
    let starts = |events: &[CalendarEvent]| events.iter().map(|e| e.start.at).collect::<Vec<_>>();
    assert_eq!(starts(&original[..]), starts(&reimported[..]));
}
