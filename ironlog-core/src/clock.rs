//! Source of "today" and "now" for the repository.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

pub trait Clock {
    /// Current calendar day in the user's local time zone.
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on the given day.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_time(NaiveTime::MIN) + chrono::Duration::hours(12);
        Self::new(noon.and_utc())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
