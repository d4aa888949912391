//! Date range for filtering events.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalResult, CalendarError};
use crate::event::EventTime;

/// Date range for filtering events.
/// None values mean unbounded in that direction; both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> CalResult<Self> {
        if to < from {
            return Err(CalendarError::InvalidTimeRange(format!(
                "range ends ({}) before it starts ({})",
                to, from
            )));
        }
        Ok(DateRange {
            from: Some(from),
            to: Some(to),
        })
    }

    /// Parse CLI-style bounds.
    /// - `from`: "start" or absent for unbounded, or YYYY-MM-DD (start of day in `tz`)
    /// - `to`: absent for unbounded, or YYYY-MM-DD (end of day in `tz`)
    pub fn from_args(from: Option<&str>, to: Option<&str>, tz: Tz) -> CalResult<Self> {
        let from_dt = match from {
            None | Some("start") => None,
            Some(s) => Some(parse_date_start(s, tz)?),
        };

        let to_dt = match to {
            Some(s) => Some(parse_date_end(s, tz)?),
            None => None,
        };

        if let (Some(f), Some(t)) = (from_dt, to_dt) {
            return Self::new(f, t);
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

fn parse_date(s: &str) -> CalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CalendarError::InvalidTimeRange(format!(
            "Invalid date format '{}'. Expected YYYY-MM-DD",
            s
        ))
    })
}

/// Parse YYYY-MM-DD as start of day in `tz`
fn parse_date_start(s: &str, tz: Tz) -> CalResult<DateTime<Utc>> {
    let date = parse_date(s)?;
    Ok(EventTime::from_local(date.and_time(chrono::NaiveTime::MIN), tz)?.at)
}

/// Parse YYYY-MM-DD as end of day in `tz`
fn parse_date_end(s: &str, tz: Tz) -> CalResult<DateTime<Utc>> {
    let date = parse_date(s)?;
    let end = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| CalendarError::InvalidTimeRange(format!("Invalid date '{}'", s)))?;
    Ok(EventTime::from_local(end, tz)?.at)
}
