use clap::{CommandFactory, Parser};
use station_telemetry::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // Without a subcommand, show help and exit cleanly
    if args.command.is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    cancellation_token.cancel();
                    Ok(())
                }
                Err(e) => Err(e),
            }
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => result,
            signal = shutdown_signal => match signal {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    Err(station_telemetry::Error::cancelled("interrupted by user"))
                }
                Err(e) => Err(station_telemetry::Error::io(
                    "Failed to install CTRL+C signal handler",
                    e,
                )),
            },
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
