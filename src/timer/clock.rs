use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time. No timezone is carried; everything the
/// countdown compares is naive local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
