//! Billing period primitives.
//!
//! A [`Period`] is one calendar month of one year. All "same day next month"
//! date math in the engine goes through this module so the clamping rule is
//! defined in exactly one place: a day-of-month that does not exist in the
//! target month clamps to that month's last day (Jan 31 + 1 month = Feb 28).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// One billing period: a (year, month) pair with month in 1..=12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "invalid month: {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following period.
    #[must_use]
    pub fn next(self) -> Self {
        self.plus_months(1)
    }

    /// The period `months` months later.
    #[must_use]
    pub fn plus_months(self, months: u32) -> Self {
        let zero_based = (self.month - 1) + months;
        Self {
            year: self.year + (zero_based / 12) as i32,
            month: zero_based % 12 + 1,
        }
    }

    /// First day of the period.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Period months are validated on construction, so this cannot fail.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Number of days in the period's month.
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        let next = self.next();
        next.first_day()
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    /// The given day-of-month inside this period, clamped to the last day.
    #[must_use]
    pub fn day_clamped(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }

    /// Whether a date falls inside this period.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Advances a date by one calendar month, preserving the day-of-month and
/// clamping when the target month is shorter.
#[must_use]
pub fn next_month_clamped(date: NaiveDate) -> NaiveDate {
    Period::from_date(date).next().day_clamped(date.day())
}
