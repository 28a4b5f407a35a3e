//! Shared helpers for unit tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a fixed instant, for deterministic date-boundary tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Pins the clock to noon UTC on the given day.
    pub fn at_noon(date: NaiveDate) -> Self {
        let midday = date.and_hms_opt(12, 0, 0).expect("valid time of day");
        Self(Utc.from_utc_datetime(&midday))
    }

    /// Returns the pinned day.
    pub fn today(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A convenient fixed date for tests: 2026-03-10.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
}
