//! Month range resolution
//!
//! Splits a stay `[check_in, check_out)` into the calendar months it overlaps,
//! with the number of nights spent in each.

use chrono::{Datelike, NaiveDate};
use shared::{MonthSpan, YearMonth};

use crate::error::CalcError;

/// Nights spent in one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthNights {
    pub year_month: YearMonth,
    pub nights_in_month: i32,
}

/// A stay resolved into months
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayMonths {
    pub nights_total: i32,
    /// Months with at least one night, in order
    pub months: Vec<MonthNights>,
}

/// Nights between two dates (negative when `to` precedes `from`)
pub fn nights(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Resolve a stay into the months it overlaps
///
/// `nights_in_month = max(0, nights(max(check_in, month_start), min(check_out, next_month_start)))`;
/// months with zero nights are left out. A zero-night stay yields no months.
/// Month containing `date`, within the storable year range
pub fn month_of(date: NaiveDate) -> Result<YearMonth, CalcError> {
    YearMonth::try_of(date).map_err(|_| CalcError::DateOutOfRange(date))
}

pub fn resolve_months(check_in: NaiveDate, check_out: NaiveDate) -> Result<StayMonths, CalcError> {
    let total = nights(check_in, check_out);
    if total < 0 {
        return Err(CalcError::InvertedStay {
            check_in,
            check_out,
        });
    }
    let nights_total = i32::try_from(total).map_err(|_| CalcError::StayTooLong(total))?;

    if total > 0 {
        let last_night = check_out.pred_opt().unwrap_or(check_out);
        month_of(last_night)?;
    }

    let mut months = Vec::new();
    let mut cur = month_of(check_in)?;
    while cur.first_day() < check_out {
        let next_start = cur.next().first_day();
        let from = check_in.max(cur.first_day());
        let to = check_out.min(next_start);
        // Bounded by nights_total, so it fits in i32
        let in_month = nights(from, to).max(0) as i32;
        if in_month > 0 {
            months.push(MonthNights {
                year_month: cur,
                nights_in_month: in_month,
            });
        }
        cur = cur.next();
    }

    Ok(StayMonths {
        nights_total,
        months,
    })
}

/// Month that carries the cleaning fee
///
/// Normally the month containing `check_out`. When check-out falls on the
/// 1st, the last occupied night belongs to the previous month, so that month
/// is used instead.
pub fn checkout_month(check_out: NaiveDate) -> YearMonth {
    let month = YearMonth::of(check_out);
    if check_out.day() == 1 {
        month.prev()
    } else {
        month
    }
}

/// Months a stay touches: check-in month through the month of the last night
///
/// Degenerate or inverted stays touch only their check-in month. Used to
/// scope targeted refreshes after a booking edit.
pub fn touched_months(check_in: NaiveDate, check_out: NaiveDate) -> MonthSpan {
    match check_out.pred_opt() {
        Some(last_night) if last_night >= check_in => MonthSpan::between(check_in, last_night),
        _ => MonthSpan::between(check_in, check_in),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_month_stay() {
        let stay = resolve_months(date(2025, 3, 10), date(2025, 3, 14)).unwrap();
        assert_eq!(stay.nights_total, 4);
        assert_eq!(
            stay.months,
            vec![MonthNights {
                year_month: ym("2025-03"),
                nights_in_month: 4
            }]
        );
    }

    #[test]
    fn test_stay_across_month_boundary() {
        let stay = resolve_months(date(2025, 1, 28), date(2025, 2, 3)).unwrap();
        assert_eq!(stay.nights_total, 6);
        let split: Vec<_> = stay.months.iter().map(|m| (m.year_month, m.nights_in_month)).collect();
        assert_eq!(split, vec![(ym("2025-01"), 4), (ym("2025-02"), 2)]);
    }

    #[test]
    fn test_three_and_three_needs_check_in_29th() {
        let stay = resolve_months(date(2025, 1, 29), date(2025, 2, 4)).unwrap();
        assert_eq!(stay.nights_total, 6);
        let split: Vec<_> = stay.months.iter().map(|m| (m.year_month, m.nights_in_month)).collect();
        assert_eq!(split, vec![(ym("2025-01"), 3), (ym("2025-02"), 3)]);
    }

    #[test]
    fn test_stay_past_year_9999_is_error() {
        let check_in = date(9999, 12, 30);
        let check_out = date(10000, 1, 2);
        assert_eq!(
            resolve_months(check_in, check_out),
            Err(CalcError::DateOutOfRange(date(10000, 1, 1)))
        );
        // Checking out on the first day of year 10000 is fine; the last night is 9999-12-31
        let stay = resolve_months(check_in, date(10000, 1, 1)).unwrap();
        assert_eq!(stay.months.len(), 1);
    }

    #[test]
    fn test_checkout_on_first_excludes_empty_month() {
        // Last night is Jan 31; February gets no nights and no row
        let stay = resolve_months(date(2025, 1, 29), date(2025, 2, 1)).unwrap();
        assert_eq!(stay.nights_total, 3);
        assert_eq!(stay.months.len(), 1);
        assert_eq!(stay.months[0].year_month, ym("2025-01"));
    }

    #[test]
    fn test_long_stay_spans_three_months_and_year_end() {
        let stay = resolve_months(date(2024, 11, 25), date(2025, 1, 5)).unwrap();
        let split: Vec<_> = stay.months.iter().map(|m| (m.year_month, m.nights_in_month)).collect();
        assert_eq!(
            split,
            vec![(ym("2024-11"), 6), (ym("2024-12"), 31), (ym("2025-01"), 4)]
        );
        let sum: i32 = stay.months.iter().map(|m| m.nights_in_month).sum();
        assert_eq!(sum, stay.nights_total);
    }

    #[test]
    fn test_leap_february() {
        let stay = resolve_months(date(2024, 2, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(stay.nights_total, 29);
        assert_eq!(stay.months.len(), 1);
    }

    #[test]
    fn test_zero_night_stay_has_no_months() {
        let stay = resolve_months(date(2025, 5, 5), date(2025, 5, 5)).unwrap();
        assert_eq!(stay.nights_total, 0);
        assert!(stay.months.is_empty());
    }

    #[test]
    fn test_inverted_stay_is_error() {
        let err = resolve_months(date(2025, 5, 5), date(2025, 5, 1)).unwrap_err();
        assert!(matches!(err, CalcError::InvertedStay { .. }));
    }

    #[test]
    fn test_checkout_month() {
        assert_eq!(checkout_month(date(2025, 2, 3)), ym("2025-02"));
        assert_eq!(checkout_month(date(2025, 2, 1)), ym("2025-01"));
        assert_eq!(checkout_month(date(2025, 1, 1)), ym("2024-12"));
    }

    #[test]
    fn test_touched_months() {
        let span = touched_months(date(2025, 1, 28), date(2025, 3, 1));
        assert_eq!(span.months(), vec![ym("2025-01"), ym("2025-02")]);
        let degenerate = touched_months(date(2025, 4, 2), date(2025, 4, 2));
        assert_eq!(degenerate.months(), vec![ym("2025-04")]);
    }
}
