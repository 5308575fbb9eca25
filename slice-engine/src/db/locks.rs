//! Transaction-scoped advisory locks
//!
//! One lock per month, keyed (`SLICE_LOCK_CLASS`, YYYYMM). Locks are always
//! taken in ascending month order so two scopes sharing months cannot
//! deadlock. They are released on commit or rollback.

use shared::YearMonth;
use sqlx::{Postgres, Transaction};

use super::ScopeTimeouts;

/// First key of the two-key advisory lock space reserved for month slices
pub const SLICE_LOCK_CLASS: i32 = 0x534c; // "SL"

/// Apply lock and statement timeouts to the current transaction only
pub async fn set_local_timeouts(
    tx: &mut Transaction<'_, Postgres>,
    timeouts: ScopeTimeouts,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config('lock_timeout', $1, true), set_config('statement_timeout', $2, true)")
        .bind(format!("{}ms", timeouts.lock_timeout_ms))
        .bind(format!("{}ms", timeouts.statement_timeout_ms))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Block until every month in `months` is locked (bounded by `lock_timeout`)
pub async fn acquire_month_locks(
    tx: &mut Transaction<'_, Postgres>,
    months: &[YearMonth],
) -> Result<(), sqlx::Error> {
    let mut ordered = months.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    for month in ordered {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(SLICE_LOCK_CLASS)
            .bind(month.key())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
