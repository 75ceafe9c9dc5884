use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use diskplan_domain::{add_months, first_of_month};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date.and_time(NaiveTime::default()), Utc)
    }

    fn today(&self) -> NaiveDate {
        self.date
    }
}

/// First day of the month following `current`.
pub fn advance_one_month(current: NaiveDate) -> NaiveDate {
    add_months(first_of_month(current), 1)
}
