//! Command implementations for the telemetry CLI
//!
//! Each subcommand lives in its own module; logging setup and summary printing are
//! shared.

pub mod decode;
pub mod poll;
pub mod shared;
pub mod simulate;

pub use shared::setup_logging;

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Dispatch to the subcommand handler
///
/// `cancel` is fired on Ctrl-C; long-running commands stop at the next station
/// boundary.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    setup_logging(&args)?;

    let Some(command) = args.command else {
        return Ok(());
    };

    match command {
        Commands::Decode(decode_args) => decode::run_decode(decode_args),
        Commands::Simulate(simulate_args) => simulate::run_simulate(simulate_args),
        Commands::Poll(poll_args) => poll::run_poll(poll_args, cancel).await,
    }
}
