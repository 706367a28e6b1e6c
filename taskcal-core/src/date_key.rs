//! Calendar day keys and month grids.
//!
//! Tasks are filed under a [`DateKey`], which is the **UTC** calendar day of
//! an instant. The month grid and "today" highlighting work on local calendar
//! days instead, so a local day is keyed by the UTC date of its local
//! midnight. East of UTC that is the previous UTC day.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Local, Month, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::TaskCalError;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Weekday header names, Sunday first to match the grid's column order.
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A calendar day serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

/// Key an instant by its UTC calendar day.
pub fn to_date_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateKey {
    DateKey(instant.with_timezone(&Utc).date_naive())
}

impl DateKey {
    /// Key for a calendar day in `tz`: the UTC day of that day's local midnight.
    pub fn for_local_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateKey {
        let midnight = day.and_time(NaiveTime::MIN);

        // Midnight can fall in a DST gap; the first valid instant is an hour later.
        let instant = tz
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| {
                tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                    .earliest()
            });

        match instant {
            Some(instant) => to_date_key(&instant),
            None => DateKey(day),
        }
    }

    /// Key for a calendar day in the system's local time zone.
    pub fn for_day(day: NaiveDate) -> DateKey {
        Self::for_local_day(day, &Local)
    }

    /// Key for the current instant.
    pub fn now() -> DateKey {
        to_date_key(&Utc::now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = TaskCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_KEY_FORMAT)
            .map(DateKey)
            .map_err(|_| {
                TaskCalError::Validation(format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
            })
    }
}

impl TryFrom<String> for DateKey {
    type Error = TaskCalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// True if `day` is the current local calendar day.
pub fn is_today(day: NaiveDate) -> bool {
    is_same_day(day, Local::now().date_naive())
}

pub fn is_same_day(day: NaiveDate, today: NaiveDate) -> bool {
    day.year() == today.year() && day.month() == today.month() && day.day() == today.day()
}

/// Number of days in `month` (1-12) of `year`, or None for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    YearMonth::new(year, month).map(|ym| ym.days())
}

/// A month of a year, the unit the calendar grid navigates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// `month` is 1-based (January = 1).
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| YearMonth { first })
    }

    pub fn containing(day: NaiveDate) -> Self {
        YearMonth {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    // Both steps go through day 1, so there is no day-of-month to overflow.
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| YearMonth { first })
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| YearMonth { first })
            .unwrap_or(*self)
    }

    pub fn days(&self) -> u32 {
        match self.first.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first).num_days() as u32,
            None => 31,
        }
    }

    /// English month name, e.g. "March".
    pub fn name(&self) -> &'static str {
        Month::try_from(self.month() as u8)
            .map(|m| m.name())
            .unwrap_or("")
    }

    /// Number of empty cells before day 1 (weekday of day 1, Sunday = 0).
    pub fn leading_blanks(&self) -> usize {
        self.first.weekday().num_days_from_sunday() as usize
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year())
    }
}

/// Flat grid of cells for a month: `None` placeholders up to the weekday of
/// day 1, followed by every day of the month. Not padded to whole weeks.
pub fn build_month_grid(month: YearMonth) -> Vec<Option<NaiveDate>> {
    let blanks = month.leading_blanks();
    let days = month.days() as usize;

    let mut cells = Vec::with_capacity(blanks + days);
    cells.extend(std::iter::repeat_n(None, blanks));
    cells.extend(month.first_day().iter_days().take(days).map(Some));
    cells
}
