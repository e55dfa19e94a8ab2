use chrono::{NaiveDateTime, Timelike};
use clap::Parser;
use std::path::PathBuf;

use crate::timer::TimeOfDay;

#[derive(Parser, Debug)]
#[command(version, about = "Wait until a time of day, then move a file into a folder", long_about = None)]
pub struct Args {
    /// File to move
    pub source: PathBuf,

    /// Folder to move the file into
    pub destination: PathBuf,

    /// Target time as HH:MM on a 24-hour clock
    #[arg(long, conflicts_with_all = ["hour", "minute"])]
    pub at: Option<String>,

    /// Target hour (0-23), defaults to the current hour
    #[arg(long)]
    pub hour: Option<String>,

    /// Target minute (0-59), defaults to the current minute
    #[arg(long)]
    pub minute: Option<String>,

    /// Print the outcome as a single JSON line on stdout
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Unparseable or out-of-range input means "now", like an untouched
    /// time picker.
    pub fn time_of_day(&self, now: NaiveDateTime) -> TimeOfDay {
        if let Some(at) = &self.at {
            return TimeOfDay::parse_clock(at, now);
        }
        let hour = self.hour.clone().unwrap_or_else(|| now.hour().to_string());
        let minute = self
            .minute
            .clone()
            .unwrap_or_else(|| now.minute().to_string());
        TimeOfDay::parse_or_now(&hour, &minute, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 41, 10)
            .unwrap()
    }

    #[test]
    fn at_flag_wins() {
        let args = Args::try_parse_from(["filetimer", "a.txt", "out", "--at", "17:05"]).unwrap();
        assert_eq!(args.time_of_day(now()), TimeOfDay::new(17, 5).unwrap());
        assert!(!args.json);
    }

    #[test]
    fn missing_minute_uses_current_minute() {
        let args = Args::try_parse_from(["filetimer", "a.txt", "out", "--hour", "9", "--json"]).unwrap();
        assert_eq!(args.time_of_day(now()), TimeOfDay::new(9, 41).unwrap());
        assert!(args.json);
    }

    #[test]
    fn nothing_given_means_now() {
        let args = Args::try_parse_from(["filetimer", "a.txt", "out"]).unwrap();
        assert_eq!(args.time_of_day(now()), TimeOfDay::new(8, 41).unwrap());
    }

    #[test]
    fn at_conflicts_with_hour() {
        let parsed = Args::try_parse_from(["filetimer", "a", "b", "--at", "10:00", "--hour", "3"]);
        assert!(parsed.is_err());
    }
}
