//! dicurve CLI - fit daily DI yield curves from a CSV of observations.
//!
//! # Usage
//!
//! ```bash
//! # Fit every date with the Svensson model and print the date x maturity table
//! dicurve fit --input di1.csv
//!
//! # Linear interpolation on a custom grid, maturities in years, as JSON
//! dicurve --format json fit --input di1.csv --method linear --start 21 --end 2520 --years
//!
//! # Inspect one date's fit and parameters
//! dicurve --format table curve --input di1.csv --date 2024-12-02
//!
//! # Print the effective configuration
//! dicurve config show --config dicurve.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod input;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so tables on stdout stay machine-readable
    let default_filter = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;

    match cli.command {
        Commands::Fit(args) => commands::fit::execute(args, format, cli.quiet)?,
        Commands::Curve(args) => commands::curve::execute(args, format)?,
        Commands::Config(args) => commands::config::execute(args)?,
    }

    Ok(())
}
