//! Service-day time handling.
//!
//! Schedules store minute-of-day values. Searches work in elapsed minutes
//! from midnight of the query's service day, so a time past midnight is
//! represented as `1440 + m` rather than wrapping back to `m`. This keeps
//! times monotonic along an itinerary.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Error returned when parsing an invalid `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: expected HH:MM")]
pub struct InvalidClockTime {
    input: String,
}

/// Which timetable applies on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceDay {
    Weekday,
    Weekend,
}

impl ServiceDay {
    /// Saturdays and Sundays run the weekend timetable.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => ServiceDay::Weekend,
            _ => ServiceDay::Weekday,
        }
    }

    pub fn from_is_weekend(is_weekend: bool) -> Self {
        if is_weekend {
            ServiceDay::Weekend
        } else {
            ServiceDay::Weekday
        }
    }
}

impl fmt::Display for ServiceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceDay::Weekday => f.write_str("weekday"),
            ServiceDay::Weekend => f.write_str("weekend"),
        }
    }
}

/// Minutes since midnight for a wall-clock time.
pub fn minute_of_day(time: NaiveTime) -> f64 {
    f64::from(time.hour() * 60 + time.minute())
}

/// Parse an `HH:MM` string into minutes since midnight.
pub fn parse_clock(s: &str) -> Result<f64, InvalidClockTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map(minute_of_day)
        .map_err(|_| InvalidClockTime {
            input: s.to_string(),
        })
}

/// Render elapsed service-day minutes as `HH:MM`.
///
/// Times on a following day get a `+N` suffix. Seconds are truncated.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::format_clock;
///
/// assert_eq!(format_clock(485.0), "08:05");
/// assert_eq!(format_clock(1445.5), "00:05+1");
/// ```
pub fn format_clock(minutes: f64) -> String {
    if !minutes.is_finite() || minutes < 0.0 {
        return String::new();
    }
    let total = minutes.floor() as i64;
    let day = total / 1440;
    let in_day = total % 1440;
    let clock = format!("{:02}:{:02}", in_day / 60, in_day % 60);
    if day > 0 {
        format!("{clock}+{day}")
    } else {
        clock
    }
}
