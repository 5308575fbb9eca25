//! slice-engine: month slice materialization
//!
//! One-shot command: validates arguments, connects, runs one refresh or
//! report query, exits.
//!
//! Exit codes: 0 success, 1 one or more scopes failed (or a runtime error),
//! 2 invalid arguments or configuration.

use clap::Parser;
use slice_engine::cli::{self, Cli};
use slice_engine::{Config, EngineError, PgSliceStore, RefreshOrchestrator};
use std::process::ExitCode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.database_url.clone() {
        config.database_url = Some(url);
    }

    slice_engine::logger::init_logger(&config.log_level, config.log_dir.as_deref())?;

    // Reject bad input before touching the database
    let request = match cli.request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let store = match PgSliceStore::connect(&config).await {
        Ok(store) => store,
        Err(e @ EngineError::Config(_)) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(command = ?request, "Running");

    let orchestrator = RefreshOrchestrator::new(store, config.slice_policy());
    let mut stdout = std::io::stdout().lock();
    let all_succeeded = cli::execute(&request, &orchestrator, &mut stdout).await?;

    orchestrator.store().pool().close().await;

    if all_succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
