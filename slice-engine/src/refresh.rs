//! Refresh orchestration
//!
//! Turns a trigger (full rebuild, one month, one booking) into a list of
//! scopes and runs each through [`SliceStore::replace_scope`]. Scopes are
//! independent: a failed scope is rolled back and reported, and the
//! remaining scopes still run.

use chrono::NaiveDate;
use shared::{Booking, MonthSlice, YearMonth};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::month_range;
use crate::slicer::{SlicePolicy, slices_for_booking};
use crate::store::{ReplaceSummary, ScopeRows, SkippedBooking, SliceScope, SliceStore};

/// Compute the complete contents of `scope` from the bookings loaded for it
///
/// Each booking goes through the same [`slices_for_booking`] a full rebuild
/// uses; only rows keyed inside the scope are kept.
pub fn plan_scope(scope: &SliceScope, bookings: &[Booking], policy: &SlicePolicy) -> ScopeRows {
    let mut planned = ScopeRows::default();

    for booking in bookings {
        match slices_for_booking(booking, policy) {
            Ok(slices) => planned.rows.extend(
                slices
                    .into_iter()
                    .filter(|s| scope.contains(s.booking_id, s.year_month)),
            ),
            Err(reason) => {
                warn!(booking_id = booking.id, scope = %scope, error = %reason, "Skipping booking");
                planned.skipped.push(SkippedBooking {
                    booking_id: booking.id,
                    reason,
                });
            }
        }
    }

    planned.rows.sort_by_key(MonthSlice::key);
    planned
}

/// Which trigger produced a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMode {
    All,
    Month(YearMonth),
    Booking(i64),
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::All => f.write_str("refresh-all"),
            RefreshMode::Month(month) => write!(f, "refresh-month {month}"),
            RefreshMode::Booking(id) => write!(f, "refresh-booking {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeStatus {
    Replaced(ReplaceSummary),
    /// Rolled back; holds the storage error message
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOutcome {
    pub scope: SliceScope,
    pub status: ScopeStatus,
}

impl ScopeOutcome {
    pub fn summary(&self) -> Option<&ReplaceSummary> {
        match &self.status {
            ScopeStatus::Replaced(summary) => Some(summary),
            ScopeStatus::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ScopeStatus::Failed(_))
    }
}

impl fmt::Display for ScopeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ScopeStatus::Replaced(s) => write!(
                f,
                "{}: deleted={} inserted={} skipped={}",
                self.scope,
                s.deleted,
                s.inserted,
                s.skipped.len()
            ),
            ScopeStatus::Failed(message) => write!(f, "{}: FAILED ({message})", self.scope),
        }
    }
}

/// Per-scope results of one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub mode: RefreshMode,
    pub scopes: Vec<ScopeOutcome>,
}

impl RefreshReport {
    pub fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            scopes: Vec::new(),
        }
    }

    pub fn deleted(&self) -> u64 {
        self.scopes.iter().filter_map(ScopeOutcome::summary).map(|s| s.deleted).sum()
    }

    pub fn inserted(&self) -> u64 {
        self.scopes.iter().filter_map(ScopeOutcome::summary).map(|s| s.inserted).sum()
    }

    /// Distinct bookings skipped in any committed scope
    pub fn skipped_bookings(&self) -> Vec<i64> {
        let ids: BTreeSet<i64> = self
            .scopes
            .iter()
            .filter_map(ScopeOutcome::summary)
            .flat_map(|s| s.skipped.iter().map(|b| b.booking_id))
            .collect();
        ids.into_iter().collect()
    }

    pub fn failed(&self) -> Vec<&ScopeOutcome> {
        self.scopes.iter().filter(|o| o.is_failed()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.scopes.iter().all(|o| !o.is_failed())
    }
}

/// Runs refresh modes against a [`SliceStore`]
#[derive(Debug)]
pub struct RefreshOrchestrator<S> {
    store: S,
    policy: SlicePolicy,
}

impl<S: SliceStore> RefreshOrchestrator<S> {
    pub fn new(store: S, policy: SlicePolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn policy(&self) -> &SlicePolicy {
        &self.policy
    }

    /// Full rebuild: every month from the earliest check-in to the latest
    /// check-out, plus every month that still holds rows
    pub async fn refresh_all(&self) -> EngineResult<RefreshReport> {
        let mut months: BTreeSet<YearMonth> = BTreeSet::new();
        if let Some(span) = self.store.stay_span().await? {
            months.extend(span.months());
        }
        months.extend(self.store.materialized_months().await?);

        info!(months = months.len(), "Starting full rebuild");

        let mut report = RefreshReport::new(RefreshMode::All);
        for month in months {
            report.scopes.push(self.run_scope(SliceScope::Month(month)).await);
        }

        info!(
            scopes = report.scopes.len(),
            failed = report.failed().len(),
            deleted = report.deleted(),
            inserted = report.inserted(),
            "Full rebuild finished"
        );
        Ok(report)
    }

    /// Replace every row of `month` across all bookings
    pub async fn refresh_month(&self, month: YearMonth) -> EngineResult<RefreshReport> {
        let mut report = RefreshReport::new(RefreshMode::Month(month));
        report.scopes.push(self.run_scope(SliceScope::Month(month)).await);
        Ok(report)
    }

    /// Replace one booking's rows in exactly `months`
    ///
    /// A booking that no longer exists just has those rows deleted.
    pub async fn refresh_booking(&self, booking_id: i64, months: &[YearMonth]) -> EngineResult<RefreshReport> {
        if months.is_empty() {
            return Err(EngineError::Validation(format!(
                "no months given for booking #{booking_id}"
            )));
        }

        let mut months = months.to_vec();
        months.sort_unstable();
        months.dedup();

        let mut report = RefreshReport::new(RefreshMode::Booking(booking_id));
        report
            .scopes
            .push(self.run_scope(SliceScope::Booking { booking_id, months }).await);
        Ok(report)
    }

    /// Targeted refresh after a booking was created, edited or deleted
    ///
    /// `previous_stay` is the (check-in, check-out) before the edit, if the
    /// dates changed. Covers the months of the old stay, the new stay and the
    /// current check-in month.
    pub async fn refresh_after_edit(
        &self,
        booking_id: i64,
        previous_stay: Option<(NaiveDate, NaiveDate)>,
    ) -> EngineResult<RefreshReport> {
        let mut months: BTreeSet<YearMonth> = BTreeSet::new();

        if let Some((check_in, check_out)) = previous_stay {
            months.extend(month_range::touched_months(check_in, check_out).months());
        }
        if let Some(booking) = self.store.find_booking(booking_id).await? {
            months.extend(month_range::touched_months(booking.check_in, booking.check_out).months());
            months.insert(YearMonth::of(booking.check_in));
        }

        if months.is_empty() {
            warn!(booking_id, "Booking not found and no previous stay given; nothing to refresh");
            return Ok(RefreshReport::new(RefreshMode::Booking(booking_id)));
        }

        debug!(booking_id, months = months.len(), "Refreshing after booking edit");
        let months: Vec<YearMonth> = months.into_iter().collect();
        self.refresh_booking(booking_id, &months).await
    }

    async fn run_scope(&self, scope: SliceScope) -> ScopeOutcome {
        let policy = &self.policy;
        let planner = move |scope: &SliceScope, bookings: &[Booking]| plan_scope(scope, bookings, policy);

        let status = match self.store.replace_scope(&scope, &planner).await {
            Ok(summary) => {
                info!(
                    scope = %scope,
                    deleted = summary.deleted,
                    inserted = summary.inserted,
                    skipped = summary.skipped.len(),
                    "Scope refreshed"
                );
                ScopeStatus::Replaced(summary)
            }
            Err(e) => {
                error!(scope = %scope, error = %e, "Scope refresh failed, rolled back");
                ScopeStatus::Failed(e.to_string())
            }
        };

        ScopeOutcome { scope, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use crate::store::memory::MemoryStore;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn booking(id: i64, check_in: NaiveDate, check_out: NaiveDate) -> Booking {
        Booking {
            id,
            unit_id: 3,
            city: "Tulum".into(),
            source: "Airbnb".into(),
            payment_method: None,
            guest_type: None,
            check_in,
            check_out,
            status: "Ongoing".into(),
            payout: dec!(900.00),
            tax_percent: Some(dec!(16)),
            commission_percent: Some(dec!(20)),
            cleaning_fee: Some(dec!(30.00)),
            room_fee: None,
            tax_amount: None,
            commission_base: None,
            commission_value: None,
            client_income: None,
        }
    }

    #[test]
    fn test_plan_scope_keeps_only_scope_rows() {
        let b = booking(1, date(2025, 1, 20), date(2025, 3, 5));
        let scope = SliceScope::Month(ym("2025-02"));
        let planned = plan_scope(&scope, &[b], &SlicePolicy::default());
        assert_eq!(planned.rows.len(), 1);
        assert_eq!(planned.rows[0].year_month, ym("2025-02"));
        assert_eq!(planned.rows[0].nights_in_month, 28);
        assert!(planned.skipped.is_empty());
    }

    #[test]
    fn test_plan_scope_records_skipped_booking() {
        let bad = booking(2, date(2025, 2, 10), date(2025, 2, 1));
        let good = booking(3, date(2025, 2, 1), date(2025, 2, 4));
        let scope = SliceScope::Month(ym("2025-02"));
        let planned = plan_scope(&scope, &[bad, good], &SlicePolicy::default());
        assert_eq!(planned.rows.len(), 1);
        assert_eq!(planned.rows[0].booking_id, 3);
        assert_eq!(planned.skipped.len(), 1);
        assert_eq!(planned.skipped[0].booking_id, 2);
        assert!(matches!(planned.skipped[0].reason, CalcError::InvertedStay { .. }));
    }

    #[tokio::test]
    async fn test_refresh_booking_rejects_empty_months() {
        let orchestrator = RefreshOrchestrator::new(MemoryStore::new(), SlicePolicy::default());
        let err = orchestrator.refresh_booking(1, &[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_refresh_all_on_empty_store() {
        let orchestrator = RefreshOrchestrator::new(MemoryStore::new(), SlicePolicy::default());
        let report = orchestrator.refresh_all().await.unwrap();
        assert!(report.scopes.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_report_counts_and_display() {
        let store = MemoryStore::with_bookings([
            booking(1, date(2025, 1, 28), date(2025, 2, 3)),
            booking(2, date(2025, 2, 10), date(2025, 2, 1)),
        ]);
        store.fail_month(ym("2025-01")).await;
        let orchestrator = RefreshOrchestrator::new(store, SlicePolicy::default());

        let report = orchestrator.refresh_all().await.unwrap();
        assert_eq!(report.scopes.len(), 2);
        assert!(!report.is_success());
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].scope, SliceScope::Month(ym("2025-01")));
        assert_eq!(report.inserted(), 1);
        assert_eq!(report.skipped_bookings(), vec![2]);
        assert_eq!(
            report.scopes[1].to_string(),
            "month 2025-02: deleted=0 inserted=1 skipped=1"
        );
        assert!(report.scopes[0].to_string().starts_with("month 2025-01: FAILED"));
    }

    #[tokio::test]
    async fn test_refresh_after_edit_unknown_booking_is_noop() {
        let orchestrator = RefreshOrchestrator::new(MemoryStore::new(), SlicePolicy::default());
        let report = orchestrator.refresh_after_edit(42, None).await.unwrap();
        assert!(report.scopes.is_empty());
        assert_eq!(report.mode, RefreshMode::Booking(42));
    }
}
