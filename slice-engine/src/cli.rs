//! Command-line surface
//!
//! Arguments are parsed by clap, then validated into a [`Request`] before
//! any connection is opened, so a malformed month never reaches a write.

use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::YearMonth;
use std::io::Write;

use crate::error::{EngineError, EngineResult};
use crate::refresh::{RefreshOrchestrator, RefreshReport};
use crate::store::{SliceFilter, SliceStore};

#[derive(Parser, Debug)]
#[command(
    name = "slice-engine",
    version,
    about = "Materialize booking revenue into per-month slices"
)]
pub struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rebuild every month that has bookings or slices (default)
    RefreshAll,

    /// Rebuild one month across all bookings
    RefreshMonth {
        /// Month as YYYY-MM
        year_month: String,
    },

    /// Rebuild one booking in the given months
    RefreshBooking {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        booking_id: i64,

        /// Comma separated months, e.g. 2025-01,2025-02
        #[arg(long, required = true)]
        months: String,
    },

    /// Print slices as JSON lines
    Slices {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        unit: Option<i64>,
    },

    /// Print per-month totals as JSON lines
    Totals {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        unit: Option<i64>,
    },
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    RefreshAll,
    RefreshMonth(YearMonth),
    RefreshBooking { booking_id: i64, months: Vec<YearMonth> },
    Slices(SliceFilter),
    Totals(SliceFilter),
}

impl Request {
    pub fn is_refresh(&self) -> bool {
        !matches!(self, Request::Slices(_) | Request::Totals(_))
    }
}

fn parse_month(raw: &str) -> EngineResult<YearMonth> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Err(EngineError::Validation(
            "a single month (YYYY-MM) is required; use refresh-all to rebuild everything".into(),
        ));
    }
    Ok(raw.parse()?)
}

fn parse_filter(month: Option<&str>, unit: Option<i64>) -> EngineResult<SliceFilter> {
    Ok(SliceFilter {
        year_month: month.map(parse_month).transpose()?,
        unit_id: unit,
    })
}

impl Cli {
    /// Validate arguments into a [`Request`]; no subcommand means refresh-all
    pub fn request(&self) -> EngineResult<Request> {
        match &self.command {
            None | Some(Command::RefreshAll) => Ok(Request::RefreshAll),
            Some(Command::RefreshMonth { year_month }) => Ok(Request::RefreshMonth(parse_month(year_month)?)),
            Some(Command::RefreshBooking { booking_id, months }) => Ok(Request::RefreshBooking {
                booking_id: *booking_id,
                months: YearMonth::parse_list(months)?,
            }),
            Some(Command::Slices { month, unit }) => Ok(Request::Slices(parse_filter(month.as_deref(), *unit)?)),
            Some(Command::Totals { month, unit }) => Ok(Request::Totals(parse_filter(month.as_deref(), *unit)?)),
        }
    }
}

fn write_json_lines<T: Serialize>(out: &mut impl Write, items: &[T]) -> EngineResult<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_report(out: &mut impl Write, report: &RefreshReport) -> EngineResult<()> {
    for outcome in &report.scopes {
        writeln!(out, "{outcome}")?;
    }
    writeln!(
        out,
        "{}: scopes={} deleted={} inserted={} skipped_bookings={} failed={}",
        report.mode,
        report.scopes.len(),
        report.deleted(),
        report.inserted(),
        report.skipped_bookings().len(),
        report.failed().len()
    )?;
    for failed in report.failed() {
        writeln!(out, "retry: {}", failed.scope)?;
    }
    Ok(())
}

/// Run `request`, writing results to `out`
///
/// Returns `false` when any refresh scope failed.
pub async fn execute<S: SliceStore>(
    request: &Request,
    orchestrator: &RefreshOrchestrator<S>,
    out: &mut impl Write,
) -> EngineResult<bool> {
    let report = match request {
        Request::RefreshAll => orchestrator.refresh_all().await?,
        Request::RefreshMonth(month) => orchestrator.refresh_month(*month).await?,
        Request::RefreshBooking { booking_id, months } => orchestrator.refresh_booking(*booking_id, months).await?,
        Request::Slices(filter) => {
            let slices = orchestrator.store().slices(filter).await?;
            write_json_lines(out, &slices)?;
            return Ok(true);
        }
        Request::Totals(filter) => {
            let totals = orchestrator.store().month_totals(filter).await?;
            write_json_lines(out, &totals)?;
            return Ok(true);
        }
    };

    write_report(out, &report)?;
    Ok(report.is_success())
}
