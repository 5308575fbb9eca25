//! Booking Model
//!
//! Read-only view of a booking as supplied by the booking-management store.
//! Only the fields the month-slice engine needs are carried here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status as far as slicing is concerned
///
/// Both spellings of a cancellation ("Cancelled" / "Canceled") are accepted,
/// case-insensitively. Every other status (including a missing one) belongs
/// to the active family and keeps its original label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Active(String),
    Cancelled,
}

impl BookingStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl From<&str> for BookingStatus {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("cancelled") || trimmed.eq_ignore_ascii_case("canceled") {
            BookingStatus::Cancelled
        } else {
            BookingStatus::Active(trimmed.to_string())
        }
    }
}

impl From<String> for BookingStatus {
    fn from(value: String) -> Self {
        BookingStatus::from(value.as_str())
    }
}

impl From<Option<String>> for BookingStatus {
    fn from(value: Option<String>) -> Self {
        value.map(BookingStatus::from).unwrap_or_else(|| BookingStatus::Active(String::new()))
    }
}

impl From<BookingStatus> for String {
    fn from(value: BookingStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Active(label) => f.write_str(label),
            BookingStatus::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub unit_id: i64,
    pub city: String,
    /// Channel the booking came from (Airbnb, Private, ...)
    pub source: String,
    pub payment_method: Option<String>,
    pub guest_type: Option<String>,
    /// First night (inclusive)
    pub check_in: NaiveDate,
    /// Departure day (exclusive): the last occupied night is `check_out - 1`
    pub check_out: NaiveDate,
    #[cfg_attr(feature = "db", sqlx(try_from = "Option<String>"))]
    pub status: BookingStatus,
    pub payout: Decimal,
    pub tax_percent: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    /// Average per-night room fee; copied to every slice, never prorated
    pub room_fee: Option<Decimal>,

    // -- Stored booking-level totals (only read for cancelled bookings) --
    pub tax_amount: Option<Decimal>,
    pub commission_base: Option<Decimal>,
    pub commission_value: Option<Decimal>,
    pub client_income: Option<Decimal>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    /// Whether `source` is in the (lower-cased) allow-list; an empty list allows all
    pub fn is_source_eligible(&self, eligible: &[String]) -> bool {
        eligible.is_empty() || eligible.iter().any(|s| s.eq_ignore_ascii_case(self.source.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert!(BookingStatus::from("Cancelled").is_cancelled());
        assert!(BookingStatus::from("canceled").is_cancelled());
        assert!(BookingStatus::from(" CANCELLED ").is_cancelled());
        assert_eq!(BookingStatus::from("Ongoing"), BookingStatus::Active("Ongoing".into()));
        assert_eq!(BookingStatus::from(None), BookingStatus::Active(String::new()));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"Cancelled\"");
        let parsed: BookingStatus = serde_json::from_str("\"Past\"").unwrap();
        assert_eq!(parsed, BookingStatus::Active("Past".into()));
    }
}
