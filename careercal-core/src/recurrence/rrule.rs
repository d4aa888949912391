//! Compact RRULE text encoding for recurrence patterns.
//!
//! Supports the RFC 5545 subset `FREQ`, `INTERVAL`, `UNTIL`, `COUNT`, `BYDAY`
//! and `BYMONTHDAY`. Unknown keys (including `X-` extensions and `WKST`) are
//! ignored. The following RFC 5545 constructs are recognized but NOT supported
//! and fail with `RRuleError::Unsupported` rather than being approximated:
//!
//! - `BYHOUR`, `BYMINUTE`, `BYSECOND`, `BYSETPOS`, `BYWEEKNO`, `BYYEARDAY`, `BYMONTH`
//! - ordinal `BYDAY` entries such as `1MO` or `-1FR`
//! - multi-valued or negative `BYMONTHDAY`
//! - `FREQ=HOURLY`, `MINUTELY`, `SECONDLY`
//! - `COUNT` and `UNTIL` in the same rule

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::{CalResult, RRuleError};
use crate::recurrence::{Frequency, RecurrencePattern};

/// Two-letter weekday codes indexed by `num_days_from_sunday`.
const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

const UNSUPPORTED_KEYS: [&str; 7] = [
    "BYHOUR",
    "BYMINUTE",
    "BYSECOND",
    "BYSETPOS",
    "BYWEEKNO",
    "BYYEARDAY",
    "BYMONTH",
];

/// Parse an RRULE value (with or without the `RRULE:` prefix) into a
/// validated pattern.
pub fn parse_rrule(text: &str) -> CalResult<RecurrencePattern> {
    let body = text.trim();
    let body = match body.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &body[6..],
        _ => body,
    };

    let mut frequency = None;
    let mut pattern = RecurrencePattern::default();

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| RRuleError::MalformedPair(part.to_string()))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "FREQ" => frequency = Some(parse_frequency(value)?),
            "INTERVAL" => pattern.interval = parse_number(&key, value)?,
            "COUNT" => pattern.occurrences = Some(parse_number(&key, value)?),
            "UNTIL" => pattern.end_date = Some(parse_until(value)?),
            "BYDAY" => pattern.days_of_week = Some(parse_by_day(value)?),
            "BYMONTHDAY" => pattern.day_of_month = Some(parse_month_day(value)?),
            k if UNSUPPORTED_KEYS.contains(&k) => {
                return Err(RRuleError::Unsupported(format!("{}={}", key, value)).into());
            }
            _ => debug!(key = %key, "Ignoring unknown RRULE key"),
        }
    }

    pattern.frequency = frequency.ok_or(RRuleError::MissingFrequency)?;

    if pattern.occurrences.is_some() && pattern.end_date.is_some() {
        return Err(RRuleError::Unsupported("COUNT together with UNTIL".into()).into());
    }

    pattern.validate()?;
    Ok(pattern)
}

/// Encode a pattern as an RRULE value. Non-repeating patterns have no encoding.
///
/// `INTERVAL=1` is omitted. `UNTIL` wins over `COUNT` when both are set; the
/// two are never emitted together, so such a pattern decodes without its
/// `occurrences`.
pub fn to_rrule(pattern: &RecurrencePattern) -> Option<String> {
    let freq = match pattern.frequency {
        Frequency::None => return None,
        Frequency::Daily => "DAILY",
        Frequency::Weekly => "WEEKLY",
        Frequency::Monthly => "MONTHLY",
        Frequency::Yearly => "YEARLY",
    };

    let mut parts = vec![format!("FREQ={}", freq)];

    if pattern.interval != 1 {
        parts.push(format!("INTERVAL={}", pattern.interval));
    }

    if let Some(days) = &pattern.days_of_week {
        let codes: Vec<&str> = days
            .iter()
            .filter_map(|d| WEEKDAY_CODES.get(usize::from(*d)).copied())
            .collect();
        parts.push(format!("BYDAY={}", codes.join(",")));
    }

    if let Some(day) = pattern.day_of_month {
        parts.push(format!("BYMONTHDAY={}", day));
    }

    if let Some(end) = pattern.end_date {
        parts.push(format!("UNTIL={}", end.format("%Y%m%dT%H%M%SZ")));
    } else if let Some(count) = pattern.occurrences {
        parts.push(format!("COUNT={}", count));
    }

    Some(parts.join(";"))
}

fn parse_frequency(value: &str) -> Result<Frequency, RRuleError> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        "HOURLY" | "MINUTELY" | "SECONDLY" => {
            Err(RRuleError::Unsupported(format!("FREQ={}", value)))
        }
        _ => Err(invalid("FREQ", value)),
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, RRuleError> {
    value.parse().map_err(|_| invalid(key, value))
}

/// Accepts `YYYYMMDD`, `YYYYMMDDTHHMMSS` and `YYYYMMDDTHHMMSSZ`.
/// Date-only values cover the whole day; floating times are read as UTC.
fn parse_until(value: &str) -> Result<DateTime<Utc>, RRuleError> {
    let upper = value.to_ascii_uppercase();

    if let Some(stamp) = upper.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(stamp, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid("UNTIL", value));
    }

    if upper.contains('T') {
        return NaiveDateTime::parse_from_str(&upper, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid("UNTIL", value));
    }

    // Date-only parse requires exactly 8 digits; chrono would accept shorter years.
    if upper.len() != 8 {
        return Err(invalid("UNTIL", value));
    }

    NaiveDate::parse_from_str(&upper, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| invalid("UNTIL", value))
}

fn parse_by_day(value: &str) -> Result<BTreeSet<u8>, RRuleError> {
    let mut days = BTreeSet::new();

    for code in value.split(',').map(|c| c.trim().to_ascii_uppercase()) {
        if let Some(index) = WEEKDAY_CODES.iter().position(|w| *w == code) {
            // position() < 7
            days.insert(index as u8);
            continue;
        }

        let has_ordinal = code.len() > 2
            && WEEKDAY_CODES.iter().any(|w| code.ends_with(w))
            && code[..code.len() - 2]
                .trim_start_matches(['+', '-'])
                .chars()
                .all(|c| c.is_ascii_digit());

        if has_ordinal {
            return Err(RRuleError::Unsupported(format!("ordinal BYDAY '{}'", code)));
        }
        return Err(invalid("BYDAY", value));
    }

    Ok(days)
}

fn parse_month_day(value: &str) -> Result<u32, RRuleError> {
    if value.contains(',') {
        return Err(RRuleError::Unsupported(format!(
            "multiple BYMONTHDAY values '{}'",
            value
        )));
    }
    if value.starts_with('-') && value[1..].chars().all(|c| c.is_ascii_digit()) {
        return Err(RRuleError::Unsupported(format!(
            "negative BYMONTHDAY '{}'",
            value
        )));
    }
    parse_number("BYMONTHDAY", value)
}

fn invalid(key: &str, value: &str) -> RRuleError {
    RRuleError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalendarError;
    use chrono::TimeZone;

    fn rrule_err(text: &str) -> RRuleError {
        match parse_rrule(text) {
            Err(CalendarError::RRule(e)) => e,
            other => panic!("Expected RRULE error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_parse_weekly_with_days_and_until() {
        let pattern =
            parse_rrule("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20251231T235959Z").unwrap();

        assert_eq!(pattern.frequency, Frequency::Weekly);
        assert_eq!(pattern.interval, 2);
        assert_eq!(pattern.days_of_week, Some(BTreeSet::from([1, 3])));
        assert_eq!(
            pattern.end_date,
            Some(Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap())
        );
        assert_eq!(pattern.occurrences, None);
    }

    #[test]
    fn test_parse_accepts_prefix_case_and_whitespace() {
        let pattern = parse_rrule(" rrule:freq=monthly; bymonthday=31 ;count=3 ").unwrap();

        assert_eq!(
            pattern,
            RecurrencePattern::monthly().on_day_of_month(31).times(3)
        );
    }

    #[test]
    fn test_parse_date_only_until_covers_whole_day() {
        let pattern = parse_rrule("FREQ=DAILY;UNTIL=20250315").unwrap();

        assert_eq!(
            pattern.end_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 15, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let pattern = parse_rrule("FREQ=DAILY;WKST=MO;X-CAREERCAL-SOURCE=ai;COUNT=2").unwrap();

        assert_eq!(pattern, RecurrencePattern::daily().times(2));
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!(matches!(
            rrule_err("FREQ=DAILY;UNTIL=2025-13-01"),
            RRuleError::InvalidValue { .. }
        ));
        assert!(matches!(rrule_err("FREQ=DAILY;UNTIL=20250230"), RRuleError::InvalidValue { .. }));
        assert!(matches!(rrule_err("FREQ=DAILY;INTERVAL=two"), RRuleError::InvalidValue { .. }));
        assert!(matches!(rrule_err("FREQ=DAILY;COUNT=-1"), RRuleError::InvalidValue { .. }));
        assert!(matches!(rrule_err("FREQ=MONTHLY;BYMONTHDAY=x"), RRuleError::InvalidValue { .. }));
        assert!(matches!(rrule_err("FREQ=WEEKLY;BYDAY=XX"), RRuleError::InvalidValue { .. }));
        assert!(matches!(rrule_err("FREQ=FORTNIGHTLY"), RRuleError::InvalidValue { .. }));
        assert_eq!(rrule_err("INTERVAL=2;COUNT=3"), RRuleError::MissingFrequency);
        assert_eq!(rrule_err(""), RRuleError::MissingFrequency);
        assert_eq!(
            rrule_err("FREQ=DAILY;COUNT"),
            RRuleError::MalformedPair("COUNT".into())
        );
    }

    #[test]
    fn test_parse_reports_unsupported_constructs() {
        for text in [
            "FREQ=DAILY;BYHOUR=9",
            "FREQ=MONTHLY;BYSETPOS=-1;BYDAY=MO",
            "FREQ=YEARLY;BYMONTH=3",
            "FREQ=MONTHLY;BYDAY=1MO",
            "FREQ=MONTHLY;BYDAY=-1FR",
            "FREQ=MONTHLY;BYMONTHDAY=1,15",
            "FREQ=MONTHLY;BYMONTHDAY=-1",
            "FREQ=HOURLY",
            "FREQ=DAILY;COUNT=3;UNTIL=20250101",
        ] {
            assert!(
                matches!(rrule_err(text), RRuleError::Unsupported(_)),
                "Expected {} to be unsupported",
                text
            );
        }
    }

    #[test]
    fn test_parse_validates_result() {
        assert!(matches!(
            parse_rrule("FREQ=DAILY;BYMONTHDAY=3"),
            Err(CalendarError::InvalidPattern(_))
        ));
        assert!(matches!(
            parse_rrule("FREQ=DAILY;INTERVAL=0"),
            Err(CalendarError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_to_rrule_omits_default_interval_and_prefers_until() {
        let pattern = RecurrencePattern::weekly()
            .on_weekdays([5, 1])
            .times(10)
            .until(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

        assert_eq!(
            to_rrule(&pattern).unwrap(),
            "FREQ=WEEKLY;BYDAY=MO,FR;UNTIL=20250601T000000Z"
        );
        assert_eq!(
            to_rrule(&RecurrencePattern::monthly().every(3).times(4)).unwrap(),
            "FREQ=MONTHLY;INTERVAL=3;COUNT=4"
        );
        assert_eq!(to_rrule(&RecurrencePattern::none()), None);
    }

    #[test]
    fn test_round_trip_drops_count_when_until_is_set() {
        let until = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let pattern = RecurrencePattern::weekly().until(until).times(3);

        let decoded = parse_rrule(&to_rrule(&pattern).unwrap()).unwrap();

        assert_ne!(decoded, pattern);
        assert_eq!(decoded, RecurrencePattern::weekly().until(until));
    }

    #[test]
    fn test_round_trip_is_semantically_stable() {
        for text in [
            "FREQ=DAILY",
            "FREQ=WEEKLY;INTERVAL=2;BYDAY=SU,TU,SA;COUNT=6",
            "FREQ=MONTHLY;BYMONTHDAY=31;UNTIL=20261130T090000Z",
            "FREQ=YEARLY;INTERVAL=4",
        ] {
            let pattern = parse_rrule(text).unwrap();
            let encoded = to_rrule(&pattern).unwrap();

            assert_eq!(encoded, text);
            assert_eq!(parse_rrule(&encoded).unwrap(), pattern);
        }
    }

    #[test]
    fn test_encoded_rules_are_valid_rfc5545() {
        let patterns = [
            RecurrencePattern::daily().every(3).times(5),
            RecurrencePattern::weekly().on_weekdays([0, 6]),
            RecurrencePattern::monthly()
                .on_day_of_month(15)
                .until(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            RecurrencePattern::yearly().times(2),
        ];

        for pattern in patterns {
            let encoded = to_rrule(&pattern).unwrap();
            let parsed: Result<::rrule::RRule<::rrule::Unvalidated>, _> = encoded.parse();
            assert!(parsed.is_ok(), "rrule crate rejected {}: {:?}", encoded, parsed.err());
        }
    }
}
