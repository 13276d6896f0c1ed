//! Halberd CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use halberd::cli::args::*;
use halberd::cli::commands::*;

fn main() {
    // Parse command line arguments using clap
    let args = HalberdArgs::parse();

    // RUST_LOG wins over the verbosity flags
    let default_filter = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "halberd=info,warn",
        _ => "halberd=debug,info",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
