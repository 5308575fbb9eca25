//! Shared types for the booking month-slice workspace
//!
//! Booking records as read from the booking store, the derived month-slice
//! rows written for owner statements and commission reports, and the
//! calendar-month value types used to scope refreshes.

pub mod error;
pub mod models;

// Re-exports
pub use error::ParseError;
pub use models::{Booking, BookingStatus, MonthSlice, MonthSpan, MonthTotals, YearMonth};
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
