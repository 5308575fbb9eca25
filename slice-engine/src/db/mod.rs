//! PostgreSQL slice store
//!
//! Bookings are read from `all_bookings` (owned by the booking service);
//! slices live in `booking_month_slice` (created by this crate's migrations).
//! Every scope runs in its own transaction:
//!
//! 1. `SET LOCAL` lock/statement timeouts
//! 2. advisory locks on the scope's months (ascending)
//! 3. load the scope's bookings, plan the rows
//! 4. delete the scope's rows, insert the planned rows
//! 5. commit (dropping the transaction on error rolls it back)

pub mod bookings;
pub mod locks;
pub mod slices;

use async_trait::async_trait;
use shared::{Booking, MonthSlice, MonthSpan, YearMonth};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::config::Config;
use crate::error::{EngineError, StoreResult};
use crate::store::{ReplaceSummary, ScopePlanner, SliceFilter, SliceScope, SliceStore};

/// Per-scope transaction limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeTimeouts {
    pub lock_timeout_ms: u64,
    pub statement_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct PgSliceStore {
    pool: PgPool,
    timeouts: ScopeTimeouts,
}

impl PgSliceStore {
    pub fn new(pool: PgPool, timeouts: ScopeTimeouts) -> Self {
        Self { pool, timeouts }
    }

    /// Connect using `config`, running embedded migrations if enabled
    pub async fn connect(config: &Config) -> Result<Self, EngineError> {
        let database_url = config.database_url()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(database_url)
            .await?;

        tracing::info!("Connected to PostgreSQL");

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(crate::error::StoreError::from)?;
        }

        Ok(Self::new(pool, config.scope_timeouts()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SliceStore for PgSliceStore {
    async fn replace_scope(
        &self,
        scope: &SliceScope,
        planner: ScopePlanner<'_>,
    ) -> StoreResult<ReplaceSummary> {
        let mut tx = self.pool.begin().await?;

        locks::set_local_timeouts(&mut tx, self.timeouts).await?;
        locks::acquire_month_locks(&mut tx, &scope.months()).await?;

        let loaded = match scope {
            SliceScope::Booking { booking_id, .. } => bookings::find_booking(&mut *tx, *booking_id)
                .await?
                .into_iter()
                .collect(),
            SliceScope::Month(month) => bookings::bookings_for_month(&mut *tx, *month).await?,
        };
        let planned = planner(scope, &loaded);

        let deleted = slices::delete_scope(&mut tx, scope).await?;
        let inserted = slices::insert_slices(&mut tx, &planned.rows).await?;

        tx.commit().await?;

        tracing::debug!(scope = %scope, deleted, inserted, "Scope replaced");
        Ok(ReplaceSummary {
            deleted,
            inserted,
            skipped: planned.skipped,
        })
    }

    async fn find_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>> {
        Ok(bookings::find_booking(&self.pool, booking_id).await?)
    }

    async fn stay_span(&self) -> StoreResult<Option<MonthSpan>> {
        Ok(bookings::stay_span(&self.pool).await?)
    }

    async fn materialized_months(&self) -> StoreResult<Vec<YearMonth>> {
        slices::materialized_months(&self.pool).await
    }

    async fn slices(&self, filter: &SliceFilter) -> StoreResult<Vec<MonthSlice>> {
        Ok(slices::list_slices(&self.pool, filter).await?)
    }
}
