//! Logging Infrastructure
//!
//! Console logs go to stderr so stdout stays machine-readable (report
//! queries print JSON lines there). With a log directory, a daily rotating
//! JSON file is written as well.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when neither RUST_LOG nor LOG_LEVEL says otherwise
pub const DEFAULT_FILTER: &str = "slice_engine=info";

/// Build the filter: RUST_LOG wins, then `level`
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - filter directive used when RUST_LOG is unset (e.g. "info", "slice_engine=debug")
/// * `log_dir` - optional directory for daily rotating JSON logs
pub fn init_logger(level: &str, log_dir: Option<&str>) -> std::io::Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter(level));

    let registry = tracing_subscriber::registry().with(console_layer);

    if let Some(dir) = log_dir {
        let dir = Path::new(dir);
        fs::create_dir_all(dir)?;

        let file_log = RollingFileAppender::new(Rotation::DAILY, dir, "slice-engine");
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::sync::Mutex::new(file_log))
            .with_filter(env_filter(level));

        registry.with(file_layer).init();
    } else {
        registry.init();
    }

    Ok(())
}
