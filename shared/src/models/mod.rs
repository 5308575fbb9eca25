//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGINT). Money is `Decimal`, never `f64`.

pub mod booking;
pub mod month_slice;
pub mod year_month;

// Re-exports
pub use booking::*;
pub use month_slice::*;
pub use year_month::*;
