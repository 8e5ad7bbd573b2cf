//! Calendar utilities
//!
//! Pure date math used by the engine: month enumeration, weekday
//! classification and ISO week identity for weekend counting.
//!
//! # Example
//!
//! ```rust
//! use guardia_core::calendar::{DayClass, YearMonth};
//!
//! let march: YearMonth = "2024-03".parse().unwrap();
//! assert_eq!(march.num_days(), 31);
//!
//! let first = march.first_day();
//! assert_eq!(DayClass::of(first), DayClass::Friday);
//! ```

use chrono::{Datelike, IsoWeek, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// YearMonth
// ============================================================================

/// A calendar month identified by year and month number.
///
/// Serialized as `"YYYY-MM"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Create a month, returning `None` for an out-of-range month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
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

    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.first)
    }

    /// Number of days in the month (28..=31)
    pub fn num_days(&self) -> u32 {
        self.days().count() as u32
    }

    /// Every day of the month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first
            .iter_days()
            .take_while(move |d| d.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Error parsing a `YYYY-MM` month identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid month '{0}' (expected YYYY-MM)")]
pub struct ParseMonthError(pub String);

impl FromStr for YearMonth {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMonthError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ParseMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

// ============================================================================
// Day classification
// ============================================================================

/// Weekday classes that carry their own monthly caps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayClass {
    /// Monday to Wednesday
    Regular,
    Thursday,
    Friday,
    /// Saturday or Sunday
    Weekend,
}

impl DayClass {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Thu => DayClass::Thursday,
            Weekday::Fri => DayClass::Friday,
            Weekday::Sat | Weekday::Sun => DayClass::Weekend,
            _ => DayClass::Regular,
        }
    }
}

pub fn is_thursday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Thu
}

pub fn is_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// ISO week used to identify the weekend a date belongs to.
///
/// ISO weeks start on Monday, so a Saturday and the following Sunday share
/// the same week. Returns `None` for weekdays.
pub fn weekend_week(date: NaiveDate) -> Option<IsoWeek> {
    is_weekend(date).then(|| date.iso_week())
}

/// Absolute distance in calendar days
pub fn days_apart(a: NaiveDate, b: NaiveDate) -> i64 {
    a.signed_duration_since(b).num_days().abs()
}

// ============================================================================
// Tests
// ============================================================================
