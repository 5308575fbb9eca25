//! Booking read queries (`all_bookings`)

use chrono::NaiveDate;
use shared::{Booking, MonthSpan, YearMonth};
use sqlx::PgExecutor;

const BOOKING_COLUMNS: &str = r#"
    id,
    unit_id,
    COALESCE(city, '') AS city,
    COALESCE(source, '') AS source,
    payment_method,
    guest_type,
    check_in,
    check_out,
    status,
    COALESCE(payout, 0) AS payout,
    tax_percent,
    commission_percent,
    cleaning_fee,
    room_fee,
    tax_amount,
    commission_base,
    commission_value,
    client_income
"#;

pub async fn find_booking<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: i64,
) -> Result<Option<Booking>, sqlx::Error> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM all_bookings WHERE id = $1");
    sqlx::query_as::<_, Booking>(&sql)
        .bind(booking_id)
        .fetch_optional(executor)
        .await
}

/// Bookings that may produce a row in `month`
///
/// Stays overlapping the month, plus any booking checking in during the
/// month (a cancelled booking's slice sits in its check-in month whatever
/// its check-out).
pub async fn bookings_for_month<'e>(
    executor: impl PgExecutor<'e>,
    month: YearMonth,
) -> Result<Vec<Booking>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM all_bookings
        WHERE check_in < $2
          AND (check_out > $1 OR check_in >= $1)
        ORDER BY id
        "#
    );
    sqlx::query_as::<_, Booking>(&sql)
        .bind(month.first_day())
        .bind(month.next().first_day())
        .fetch_all(executor)
        .await
}

/// Earliest check-in month through latest check-out month
pub async fn stay_span<'e>(executor: impl PgExecutor<'e>) -> Result<Option<MonthSpan>, sqlx::Error> {
    let (first, last): (Option<NaiveDate>, Option<NaiveDate>) =
        sqlx::query_as("SELECT MIN(check_in), MAX(check_out) FROM all_bookings")
            .fetch_one(executor)
            .await?;
    Ok(first.zip(last).map(|(first, last)| MonthSpan::between(first, last)))
}
