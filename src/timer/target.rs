use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated hour/minute pair on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn from_datetime(now: NaiveDateTime) -> Self {
        Self {
            hour: now.hour(),
            minute: now.minute(),
        }
    }

    /// Parses user-entered hour and minute text. Anything that is not a
    /// number in range falls back to the current hour and minute.
    pub fn parse_or_now(hour: &str, minute: &str, now: NaiveDateTime) -> Self {
        let parsed = hour
            .trim()
            .parse::<u32>()
            .ok()
            .zip(minute.trim().parse::<u32>().ok())
            .and_then(|(h, m)| Self::new(h, m));

        parsed.unwrap_or_else(|| {
            let fallback = Self::from_datetime(now);
            warn!(
                "invalid target time {:?}:{:?}, falling back to {}",
                hour, minute, fallback
            );
            fallback
        })
    }

    /// Same as [`TimeOfDay::parse_or_now`] for the `HH:MM` form.
    pub fn parse_clock(value: &str, now: NaiveDateTime) -> Self {
        match value.split_once(':') {
            Some((hour, minute)) => Self::parse_or_now(hour, minute, now),
            None => Self::parse_or_now(value, "", now),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Today at `time` with zeroed seconds, or the same time tomorrow when that
/// moment is already behind `now`.
pub fn resolve_target(time: TimeOfDay, now: NaiveDateTime) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(time.hour, time.minute, 0).unwrap_or_default();
    let today = now.date().and_time(at);
    if today < now {
        today + Duration::days(1)
    } else {
        today
    }
}
