//! docexpand CLI binary.

use std::process;

use clap::Parser;
use docexpand::cli::{args::*, commands::*};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Parse command line arguments using clap
    let args = DocExpandArgs::parse();

    // DOCEXPAND_LOG takes precedence over the verbosity flags
    let filter = EnvFilter::try_from_env("DOCEXPAND_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("docexpand={}", args.log_level())));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
