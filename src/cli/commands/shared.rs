//! Shared components for CLI commands

use crate::app::services::ingestion::CycleReport;
use crate::cli::args::Args;
use crate::{Error, Result};
use colored::Colorize;
use tracing::debug;

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("station_telemetry={}", log_level)));

    let result = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Print a cycle summary to stdout
pub fn print_cycle_summary(title: &str, report: &CycleReport) {
    println!("{}", title.bright_green().bold());
    println!(
        "   • Attempted: {}  Succeeded: {}  Failed: {}",
        report.attempted,
        report.succeeded.to_string().bright_green(),
        if report.failed > 0 {
            report.failed.to_string().bright_red()
        } else {
            report.failed.to_string().normal()
        }
    );
    println!(
        "   • Stations {} / {}",
        format!("{} ONLINE", report.online).bright_cyan(),
        format!("{} OFFLINE", report.offline).bright_yellow()
    );
    if report.ineligible > 0 {
        println!(
            "   • Not polled: {}",
            report.ineligible.to_string().bright_black()
        );
    }
    if report.was_cancelled() {
        println!(
            "   • {} skipped after cancellation",
            report.cancelled.to_string().bright_yellow()
        );
    }
    if report.attempted > 0 {
        println!("   • Success rate: {:.1}%", report.success_rate());
    }
    for error in &report.errors {
        println!("   {} {}", "✗".bright_red(), error);
    }
}
