//! Slice table operations (`booking_month_slice`)

use shared::{MonthSlice, YearMonth};
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::error::{StoreError, StoreResult};
use crate::store::{SliceFilter, SliceScope};

const SLICE_COLUMNS: &str = r#"
    booking_id, year_month,
    unit_id, city, source, payment_method, guest_type,
    month_start_date, month_end_date, nights_total, nights_in_month,
    room_fee_in_month, payout_in_month, tax_in_month, net_payout_in_month,
    cleaning_fee_in_month, commission_base_in_month,
    o2_commission_in_month, owner_payout_in_month
"#;

/// Delete every row in `scope`, returning the count
pub async fn delete_scope(
    tx: &mut Transaction<'_, Postgres>,
    scope: &SliceScope,
) -> Result<u64, sqlx::Error> {
    let result = match scope {
        SliceScope::Booking { booking_id, months } => {
            let months: Vec<String> = months.iter().map(ToString::to_string).collect();
            sqlx::query("DELETE FROM booking_month_slice WHERE booking_id = $1 AND year_month = ANY($2)")
                .bind(*booking_id)
                .bind(&months)
                .execute(&mut **tx)
                .await?
        }
        SliceScope::Month(month) => {
            sqlx::query("DELETE FROM booking_month_slice WHERE year_month = $1")
                .bind(month.to_string())
                .execute(&mut **tx)
                .await?
        }
    };
    Ok(result.rows_affected())
}

pub async fn insert_slices(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[MonthSlice],
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO booking_month_slice ({SLICE_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        "#
    );

    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query(&sql)
            .bind(row.booking_id)
            .bind(row.year_month.to_string())
            .bind(row.unit_id)
            .bind(&row.city)
            .bind(&row.source)
            .bind(&row.payment_method)
            .bind(&row.guest_type)
            .bind(row.month_start_date)
            .bind(row.month_end_date)
            .bind(row.nights_total)
            .bind(row.nights_in_month)
            .bind(row.room_fee_in_month)
            .bind(row.payout_in_month)
            .bind(row.tax_in_month)
            .bind(row.net_payout_in_month)
            .bind(row.cleaning_fee_in_month)
            .bind(row.commission_base_in_month)
            .bind(row.o2_commission_in_month)
            .bind(row.owner_payout_in_month)
            .execute(&mut **tx)
            .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

pub async fn materialized_months<'e>(executor: impl PgExecutor<'e>) -> StoreResult<Vec<YearMonth>> {
    let raw: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT year_month FROM booking_month_slice ORDER BY year_month")
            .fetch_all(executor)
            .await?;

    raw.into_iter()
        .map(|(ym,)| {
            ym.parse::<YearMonth>()
                .map_err(|e| StoreError::InvalidData(e.to_string()))
        })
        .collect()
}

pub async fn list_slices<'e>(
    executor: impl PgExecutor<'e>,
    filter: &SliceFilter,
) -> Result<Vec<MonthSlice>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {SLICE_COLUMNS}
        FROM booking_month_slice
        WHERE ($1::text IS NULL OR year_month = $1)
          AND ($2::bigint IS NULL OR unit_id = $2)
        ORDER BY year_month, booking_id
        "#
    );
    sqlx::query_as::<_, MonthSlice>(&sql)
        .bind(filter.year_month.map(|m| m.to_string()))
        .bind(filter.unit_id)
        .fetch_all(executor)
        .await
}
