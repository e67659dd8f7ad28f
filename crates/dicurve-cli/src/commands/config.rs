//! Config command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::load_config;
use crate::output::print_success;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// TOML configuration file; defaults are shown when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check a configuration file
    Validate {
        /// TOML configuration file
        config: PathBuf,
    },
}

/// Execute the config command.
pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigCommand::Validate { config: path } => {
            load_config(Some(path.as_path()))?;
            print_success(&format!("{} is valid", path.display()));
        }
    }
    Ok(())
}
