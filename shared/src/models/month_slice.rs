//! Month Slice Model
//!
//! One row per (booking, calendar month): the share of a booking's nights and
//! money attributable to that month. Rows are derived data; they are only
//! ever replaced wholesale by a refresh, never edited.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::YearMonth;

/// Derived month slice row, keyed by (`booking_id`, `year_month`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MonthSlice {
    pub booking_id: i64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub year_month: YearMonth,

    // -- Passthrough (copied verbatim from the booking) --
    pub unit_id: i64,
    pub city: String,
    pub source: String,
    pub payment_method: Option<String>,
    pub guest_type: Option<String>,

    pub month_start_date: NaiveDate,
    pub month_end_date: NaiveDate,
    pub nights_total: i32,
    pub nights_in_month: i32,

    // -- Money (2 decimal places) --
    pub room_fee_in_month: Decimal,
    pub payout_in_month: Decimal,
    pub tax_in_month: Decimal,
    pub net_payout_in_month: Decimal,
    pub cleaning_fee_in_month: Decimal,
    pub commission_base_in_month: Decimal,
    pub o2_commission_in_month: Decimal,
    pub owner_payout_in_month: Decimal,
}

impl MonthSlice {
    pub fn key(&self) -> (i64, YearMonth) {
        (self.booking_id, self.year_month)
    }
}

/// Per-month aggregate over a set of slices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotals {
    pub year_month: YearMonth,
    pub slice_count: i64,
    pub nights: i64,
    pub payout: Decimal,
    pub tax: Decimal,
    pub net_payout: Decimal,
    pub cleaning_fee: Decimal,
    pub commission_base: Decimal,
    pub o2_commission: Decimal,
    pub owner_payout: Decimal,
}

impl MonthTotals {
    pub fn empty(year_month: YearMonth) -> Self {
        Self {
            year_month,
            slice_count: 0,
            nights: 0,
            payout: Decimal::ZERO,
            tax: Decimal::ZERO,
            net_payout: Decimal::ZERO,
            cleaning_fee: Decimal::ZERO,
            commission_base: Decimal::ZERO,
            o2_commission: Decimal::ZERO,
            owner_payout: Decimal::ZERO,
        }
    }

    pub fn add(&mut self, slice: &MonthSlice) {
        self.slice_count += 1;
        self.nights += i64::from(slice.nights_in_month);
        self.payout += slice.payout_in_month;
        self.tax += slice.tax_in_month;
        self.net_payout += slice.net_payout_in_month;
        self.cleaning_fee += slice.cleaning_fee_in_month;
        self.commission_base += slice.commission_base_in_month;
        self.o2_commission += slice.o2_commission_in_month;
        self.owner_payout += slice.owner_payout_in_month;
    }

    /// Group slices by month, in month order
    pub fn from_slices<'a>(slices: impl IntoIterator<Item = &'a MonthSlice>) -> Vec<Self> {
        let mut by_month: std::collections::BTreeMap<YearMonth, Self> = Default::default();
        for slice in slices {
            by_month
                .entry(slice.year_month)
                .or_insert_with(|| Self::empty(slice.year_month))
                .add(slice);
        }
        by_month.into_values().collect()
    }
}
