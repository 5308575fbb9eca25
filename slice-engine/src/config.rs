//! Slice engine configuration

use crate::db::ScopeTimeouts;
use crate::error::EngineError;
use crate::slicer::SlicePolicy;

/// Slice engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PostgreSQL connection URL (env: DATABASE_URL, or `--database-url`)
    pub database_url: Option<String>,
    /// Pool size; one scope uses one connection at a time
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Max wait for a month lock before the scope fails
    pub lock_timeout_ms: u64,
    /// Max runtime of any single statement inside a scope
    pub statement_timeout_ms: u64,
    /// Booking sources that get sliced (comma separated; unset = all)
    pub eligible_sources: Vec<String>,
    /// Apply embedded migrations on connect
    pub run_migrations: bool,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
    /// Also write daily-rotated JSON logs here
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 2,
            db_acquire_timeout_secs: 5,
            lock_timeout_ms: 10_000,
            statement_timeout_ms: 60_000,
            eligible_sources: Vec::new(),
            run_migrations: true,
            log_level: crate::logger::DEFAULT_FILTER.into(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            database_url: var("DATABASE_URL"),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.db_max_connections),
            db_acquire_timeout_secs: var("DB_ACQUIRE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_acquire_timeout_secs),
            lock_timeout_ms: var("SLICE_LOCK_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lock_timeout_ms),
            statement_timeout_ms: var("SLICE_STATEMENT_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.statement_timeout_ms),
            eligible_sources: var("SLICE_ELIGIBLE_SOURCES")
                .map(|v| SlicePolicy::with_sources(v.split(',')).eligible_sources)
                .unwrap_or_default(),
            run_migrations: var("RUN_MIGRATIONS")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.run_migrations),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: var("LOG_DIR"),
        }
    }

    pub fn database_url(&self) -> Result<&str, EngineError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| EngineError::Config("DATABASE_URL must be set".into()))
    }

    pub fn scope_timeouts(&self) -> ScopeTimeouts {
        ScopeTimeouts {
            lock_timeout_ms: self.lock_timeout_ms,
            statement_timeout_ms: self.statement_timeout_ms,
        }
    }

    pub fn slice_policy(&self) -> SlicePolicy {
        SlicePolicy {
            eligible_sources: self.eligible_sources.clone(),
        }
    }
}
