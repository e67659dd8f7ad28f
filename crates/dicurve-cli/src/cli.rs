//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{ConfigArgs, CurveArgs, FitArgs};

/// dicurve - Brazilian DI yield-curve fitting
#[derive(Parser)]
#[command(name = "dicurve")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "csv", global = true)]
    pub format: OutputFormat,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fit every date in an observation file and print the curve table
    Fit(FitArgs),

    /// Fit a single date and show its curve and parameters
    Curve(CurveArgs),

    /// Inspect configuration files
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// CSV, one row per date
    #[default]
    Csv,
    /// JSON document
    Json,
    /// Human-readable table
    Table,
}
