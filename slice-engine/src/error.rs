//! Error types for the slice engine
//!
//! Three layers, matching how failures are contained:
//! - [`CalcError`]: one booking could not be sliced. The booking is skipped
//!   and counted; its scope still commits.
//! - [`StoreError`]: the storage backend failed. The current scope rolls back;
//!   scopes already committed stay valid.
//! - [`EngineError`]: top-level failures (bad input, bad config, a store
//!   failure outside any scope, or failing to write output).

use chrono::NaiveDate;
use shared::ParseError;
use thiserror::Error;

/// Per-booking calculation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("check-out {check_out} is before check-in {check_in}")]
    InvertedStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("stay of {0} nights is out of range")]
    StayTooLong(i64),

    #[error("cancelled booking with payout has no stored tax amount")]
    MissingTaxAmount,

    #[error("date {0} is outside years 1..=9999")]
    DateOutOfRange(NaiveDate),

    #[error("{0} is outside the decimal range")]
    Overflow(&'static str),
}

/// Storage backend failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Top-level engine error
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Store(err.into())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
