//! Error types for the shared crate

use thiserror::Error;

/// Parse errors for user-supplied month tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid month format: '{0}'. Expected YYYY-MM.")]
    InvalidYearMonth(String),

    #[error("Months list is empty")]
    EmptyMonthList,
}
