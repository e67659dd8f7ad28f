//! Fit command implementation.
//!
//! Fits every date in an observation file and prints the date x maturity
//! table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::cli::OutputFormat;
use crate::commands::FitOptions;
use crate::input::read_observations;
use crate::output::{print_report, write_table, MaturityUnit};

/// Arguments for the fit command.
#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(flatten)]
    pub options: FitOptions,

    /// Report maturities in years instead of days
    #[arg(long)]
    pub years: bool,

    /// Write the table to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fit dates one after another
    #[arg(long)]
    pub sequential: bool,
}

/// Execute the fit command.
pub fn execute(args: FitArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = args.options.resolve_config()?;
    let inputs = read_observations(&args.options.input, args.options.delimiter_byte()?)?;
    info!(
        "Fitting {} dates with the {} method",
        inputs.len(),
        config.method
    );

    let runner = config.batch_runner()?.with_parallel(config.series.parallel && !args.sequential);
    let outcome = runner.run(inputs)?;

    let unit = if args.years {
        MaturityUnit::Years(config.day_basis)
    } else {
        MaturityUnit::Days
    };

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_table(&mut out, outcome.series.table(), unit, format)?;
            out.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_table(&mut out, outcome.series.table(), unit, format)?;
        }
    }

    if !quiet {
        print_report(&outcome.report);
    }
    Ok(())
}
