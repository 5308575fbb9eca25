//! Calendar month value types
//!
//! `YearMonth` is the slice partition key (`YYYY-MM`); `MonthSpan` is an
//! inclusive run of consecutive months.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseError> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(ParseError::InvalidYearMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`, checked against the same year range as [`YearMonth::new`]
    pub fn try_of(date: NaiveDate) -> Result<Self, ParseError> {
        Self::new(date.year(), date.month())
    }

    /// Month containing `date`
    ///
    /// Skips the `1..=9999` year check; a date outside it gives a month whose
    /// `YYYY-MM` form does not parse back. Use [`YearMonth::try_of`] for dates
    /// read from storage.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated year-month")
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .expect("first day of a month always has a predecessor")
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Compact numeric key `YYYYMM`, used for advisory lock keys
    pub fn key(&self) -> i32 {
        self.year * 100 + self.month as i32
    }

    /// Parse a comma-separated month list, trimmed, de-duplicated and sorted
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ParseError> {
        let mut months = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Self>, _>>()?;
        if months.is_empty() {
            return Err(ParseError::EmptyMonthList);
        }
        months.sort_unstable();
        months.dedup();
        Ok(months)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    /// Strict `YYYY-MM`: four-digit year, zero-padded month 01..12
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidYearMonth(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive range of consecutive months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSpan {
    pub first: YearMonth,
    pub last: YearMonth,
}

impl MonthSpan {
    pub fn new(first: YearMonth, last: YearMonth) -> Self {
        if first <= last {
            Self { first, last }
        } else {
            Self {
                first: last,
                last: first,
            }
        }
    }

    /// Months from the month of `start` through the month of `end`
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(YearMonth::of(start), YearMonth::of(end))
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.first <= month && month <= self.last
    }

    pub fn months(&self) -> Vec<YearMonth> {
        let mut out = Vec::new();
        let mut cur = self.first;
        while cur <= self.last {
            out.push(cur);
            cur = cur.next();
        }
        out
    }
}
