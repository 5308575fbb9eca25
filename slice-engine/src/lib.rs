//! Slice Engine - booking revenue proration
//!
//! Splits each booking's nights and money across the calendar months its
//! stay covers and materializes the result as one row per (booking, month).
//!
//! # Module layout
//!
//! ```text
//! slice-engine/src/
//! ├── month_range.rs   # stay → months with nights
//! ├── slice_money/     # per-field proration formulas
//! ├── cancellation.rs  # cancelled bookings: one slice or none
//! ├── slicer.rs        # booking → complete slice set
//! ├── store/           # SliceStore trait + in-memory store
//! ├── db/              # PostgreSQL store (sqlx)
//! ├── refresh.rs       # full / month / booking refresh modes
//! ├── cli.rs           # clap commands
//! ├── config.rs        # environment configuration
//! ├── logger.rs        # tracing setup
//! └── error.rs
//! ```

pub mod cancellation;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod month_range;
pub mod refresh;
pub mod slice_money;
pub mod slicer;
pub mod store;

pub use config::Config;
pub use db::PgSliceStore;
pub use error::{CalcError, EngineError, EngineResult, StoreError, StoreResult};
pub use refresh::{RefreshMode, RefreshOrchestrator, RefreshReport, ScopeOutcome, ScopeStatus};
pub use slicer::{SlicePolicy, slices_for_booking};
pub use store::memory::MemoryStore;
pub use store::{SliceFilter, SliceScope, SliceStore};
