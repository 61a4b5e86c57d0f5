use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time left until some instant, broken down into calendar units.
///
/// The unit fields are only meaningful while `total_milliseconds` is
/// positive; they are all zero once the instant has passed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeRemaining {
    pub total_milliseconds: i64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    pub fn is_expired(&self) -> bool {
        self.total_milliseconds <= 0
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_expired() {
            return write!(f, "In progress");
        }

        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        if self.minutes > 0 {
            write!(f, "{}m ", self.minutes)?;
        }
        if self.days == 0 && self.hours == 0 {
            write!(f, "{}s ", self.seconds)?;
        }
        write!(f, "remaining")
    }
}

/// Computes how long remains from `now` until `target`.
///
/// Units are truncated, never rounded up.
pub fn compute_remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    let total_milliseconds = (target - now).num_milliseconds();
    if total_milliseconds <= 0 {
        return TimeRemaining {
            total_milliseconds,
            ..TimeRemaining::default()
        };
    }

    let total_seconds = total_milliseconds as u64 / 1000;
    TimeRemaining {
        total_milliseconds,
        days: total_seconds / SECONDS_PER_DAY,
        hours: total_seconds % SECONDS_PER_DAY / SECONDS_PER_HOUR,
        minutes: total_seconds % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
        seconds: total_seconds % SECONDS_PER_MINUTE,
    }
}

/// Formats a contest length such as `2h 30m`, `3h` or `45m`.
pub fn format_duration(duration_seconds: u64) -> String {
    let hours = duration_seconds / SECONDS_PER_HOUR;
    let minutes = duration_seconds % SECONDS_PER_HOUR / SECONDS_PER_MINUTE;

    if hours > 0 {
        if minutes > 0 {
            format!("{}h {}m", hours, minutes)
        } else {
            format!("{}h", hours)
        }
    } else {
        format!("{}m", minutes)
    }
}

/// Formats a start instant like `Sun, Nov 26, 02:35 PM` in the given zone.
pub fn format_start<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    instant
        .with_timezone(tz)
        .format("%a, %b %-d, %I:%M %p")
        .to_string()
}
