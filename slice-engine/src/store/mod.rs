//! Slice storage seam
//!
//! A refresh never updates slice rows in place. For each scope it computes
//! the complete set of rows, then swaps them in atomically: delete every row
//! in the scope, insert the computed rows, commit. [`SliceStore`] is that
//! swap, plus the read queries the orchestrator and reports need.
//!
//! Implementations:
//! - [`crate::db::PgSliceStore`]: PostgreSQL, one transaction per scope,
//!   serialized by advisory locks
//! - [`memory::MemoryStore`]: in-process, for tests and embedding

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{Booking, MonthSlice, MonthSpan, MonthTotals, YearMonth};
use std::fmt;

use crate::error::{CalcError, StoreResult};

/// The set of slice rows one refresh replaces as a unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SliceScope {
    /// One booking, restricted to explicit months
    Booking {
        booking_id: i64,
        months: Vec<YearMonth>,
    },
    /// One month, across all bookings
    Month(YearMonth),
}

impl SliceScope {
    /// Months whose rows this scope may touch, sorted and unique
    pub fn months(&self) -> Vec<YearMonth> {
        match self {
            SliceScope::Booking { months, .. } => {
                let mut months = months.clone();
                months.sort_unstable();
                months.dedup();
                months
            }
            SliceScope::Month(month) => vec![*month],
        }
    }

    /// Whether the row keyed by (`booking_id`, `year_month`) belongs to this scope
    pub fn contains(&self, booking_id: i64, year_month: YearMonth) -> bool {
        match self {
            SliceScope::Booking {
                booking_id: id,
                months,
            } => *id == booking_id && months.contains(&year_month),
            SliceScope::Month(month) => *month == year_month,
        }
    }

    /// Whether a booking's stay (or, if cancelled, its check-in month) can
    /// produce rows in this scope
    pub fn may_involve(&self, booking: &Booking) -> bool {
        match self {
            SliceScope::Booking { booking_id, .. } => *booking_id == booking.id,
            SliceScope::Month(month) => {
                let start = month.first_day();
                let next_start = month.next().first_day();
                booking.check_in < next_start
                    && (booking.check_out > start || booking.check_in >= start)
            }
        }
    }
}

impl fmt::Display for SliceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceScope::Booking { booking_id, months } => {
                let months: Vec<String> = months.iter().map(ToString::to_string).collect();
                write!(f, "booking #{booking_id} [{}]", months.join(", "))
            }
            SliceScope::Month(month) => write!(f, "month {month}"),
        }
    }
}

/// A booking left out of a scope because it could not be sliced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBooking {
    pub booking_id: i64,
    pub reason: CalcError,
}

/// Computed contents of one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRows {
    /// Rows to insert, ordered by (`booking_id`, `year_month`)
    pub rows: Vec<MonthSlice>,
    pub skipped: Vec<SkippedBooking>,
}

/// What a committed swap did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub deleted: u64,
    pub inserted: u64,
    pub skipped: Vec<SkippedBooking>,
}

/// Computes a scope's rows from the bookings the store loaded for it
///
/// Runs inside the store's critical section, so the bookings it sees are the
/// ones current when the scope's lock was taken.
pub type ScopePlanner<'a> = &'a (dyn Fn(&SliceScope, &[Booking]) -> ScopeRows + Send + Sync);

/// Report query filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceFilter {
    pub year_month: Option<YearMonth>,
    pub unit_id: Option<i64>,
}

impl SliceFilter {
    pub fn matches(&self, slice: &MonthSlice) -> bool {
        self.year_month.is_none_or(|m| m == slice.year_month)
            && self.unit_id.is_none_or(|u| u == slice.unit_id)
    }
}

/// Slice storage backend
#[async_trait]
pub trait SliceStore: Send + Sync {
    /// Atomically replace every row in `scope`
    ///
    /// Takes the scope's lock, loads the bookings that may produce rows in
    /// the scope, calls `planner`, deletes all existing rows in the scope and
    /// inserts the planned ones, then commits. On any error nothing in the
    /// scope changes.
    async fn replace_scope(
        &self,
        scope: &SliceScope,
        planner: ScopePlanner<'_>,
    ) -> StoreResult<ReplaceSummary>;

    async fn find_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>>;

    /// Months from the earliest check-in through the latest check-out
    async fn stay_span(&self) -> StoreResult<Option<MonthSpan>>;

    /// Months that currently hold at least one slice row, ascending
    async fn materialized_months(&self) -> StoreResult<Vec<YearMonth>>;

    /// Slice rows ordered by (`year_month`, `booking_id`)
    async fn slices(&self, filter: &SliceFilter) -> StoreResult<Vec<MonthSlice>>;

    async fn month_totals(&self, filter: &SliceFilter) -> StoreResult<Vec<MonthTotals>> {
        let slices = self.slices(filter).await?;
        Ok(MonthTotals::from_slices(&slices))
    }
}
