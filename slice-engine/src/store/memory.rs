//! In-memory slice store
//!
//! Holds bookings and slices in ordered maps behind one async mutex. The
//! mutex is held for the whole of `replace_scope`, which gives the same
//! serialization the PostgreSQL store gets from advisory locks. Failures can
//! be injected per month to exercise rollback paths.

use async_trait::async_trait;
use shared::{Booking, MonthSlice, MonthSpan, YearMonth};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

use super::{ReplaceSummary, ScopePlanner, SliceFilter, SliceScope, SliceStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    bookings: BTreeMap<i64, Booking>,
    slices: BTreeMap<(i64, YearMonth), MonthSlice>,
    failing_months: BTreeSet<YearMonth>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let state = MemoryState {
            bookings: bookings.into_iter().map(|b| (b.id, b)).collect(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Insert or replace a booking (does not touch slices)
    pub async fn upsert_booking(&self, booking: Booking) {
        self.state.lock().await.bookings.insert(booking.id, booking);
    }

    pub async fn remove_booking(&self, booking_id: i64) -> Option<Booking> {
        self.state.lock().await.bookings.remove(&booking_id)
    }

    /// Make every scope touching `month` fail until cleared
    pub async fn fail_month(&self, month: YearMonth) {
        self.state.lock().await.failing_months.insert(month);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failing_months.clear();
    }

    /// All slice rows, ordered by (`booking_id`, `year_month`)
    pub async fn all_slices(&self) -> Vec<MonthSlice> {
        self.state.lock().await.slices.values().cloned().collect()
    }

    /// Write a row directly, bypassing refresh (simulates stale data)
    pub async fn put_slice(&self, slice: MonthSlice) {
        self.state.lock().await.slices.insert(slice.key(), slice);
    }
}

#[async_trait]
impl SliceStore for MemoryStore {
    async fn replace_scope(
        &self,
        scope: &SliceScope,
        planner: ScopePlanner<'_>,
    ) -> StoreResult<ReplaceSummary> {
        let mut state = self.state.lock().await;

        if let Some(month) = scope.months().into_iter().find(|m| state.failing_months.contains(m)) {
            return Err(StoreError::Unavailable(format!("injected failure for {month}")));
        }

        let bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| scope.may_involve(b))
            .cloned()
            .collect();
        let planned = planner(scope, &bookings);

        let before = state.slices.len();
        state.slices.retain(|&(id, ym), _| !scope.contains(id, ym));
        let deleted = (before - state.slices.len()) as u64;

        let mut inserted = 0u64;
        for row in planned.rows {
            if state.slices.insert(row.key(), row).is_none() {
                inserted += 1;
            }
        }

        Ok(ReplaceSummary {
            deleted,
            inserted,
            skipped: planned.skipped,
        })
    }

    async fn find_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&booking_id).cloned())
    }

    async fn stay_span(&self) -> StoreResult<Option<MonthSpan>> {
        let state = self.state.lock().await;
        let first = state.bookings.values().map(|b| b.check_in).min();
        let last = state.bookings.values().map(|b| b.check_out).max();
        Ok(first.zip(last).map(|(first, last)| MonthSpan::between(first, last)))
    }

    async fn materialized_months(&self) -> StoreResult<Vec<YearMonth>> {
        let state = self.state.lock().await;
        let months: BTreeSet<YearMonth> = state.slices.keys().map(|&(_, ym)| ym).collect();
        Ok(months.into_iter().collect())
    }

    async fn slices(&self, filter: &SliceFilter) -> StoreResult<Vec<MonthSlice>> {
        let state = self.state.lock().await;
        let mut rows: Vec<MonthSlice> = state
            .slices
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.year_month, s.booking_id));
        Ok(rows)
    }
}
