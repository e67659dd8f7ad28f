//! CLI command implementations.

pub mod config;
pub mod curve;
pub mod fit;

pub use config::ConfigArgs;
pub use curve::CurveArgs;
pub use fit::FitArgs;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use dicurve_curves::{DicurveConfig, FitMethod};
use tracing::info;

use crate::error::{CliError, CliResult};

/// Fitting method choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodChoice {
    /// Piecewise-linear interpolation
    Linear,
    /// Svensson least-squares fit
    Svensson,
}

impl From<MethodChoice> for FitMethod {
    fn from(choice: MethodChoice) -> Self {
        match choice {
            MethodChoice::Linear => FitMethod::Linear,
            MethodChoice::Svensson => FitMethod::Svensson,
        }
    }
}

/// Options shared by the commands that fit curves.
#[derive(Args, Debug, Clone)]
pub struct FitOptions {
    /// Observation CSV with columns date,maturity,rate
    #[arg(short, long)]
    pub input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "DICURVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fitting method (overrides the configuration)
    #[arg(short, long, value_enum)]
    pub method: Option<MethodChoice>,

    /// First grid maturity in days
    #[arg(long)]
    pub start: Option<f64>,

    /// Last grid maturity in days
    #[arg(long)]
    pub end: Option<f64>,

    /// Number of grid points
    #[arg(long)]
    pub points: Option<usize>,

    /// CSV field delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,
}

impl FitOptions {
    /// Loads the configuration and applies command-line overrides.
    pub fn resolve_config(&self) -> CliResult<DicurveConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(method) = self.method {
            config.method = method.into();
        }
        if self.start.is_some() {
            config.grid.start = self.start;
        }
        if self.end.is_some() {
            config.grid.end = self.end;
        }
        if self.points.is_some() {
            config.grid.points = self.points;
        }
        config.validate()?;
        Ok(config)
    }

    /// The delimiter as a byte.
    pub fn delimiter_byte(&self) -> CliResult<u8> {
        u8::try_from(self.delimiter)
            .map_err(|_| CliError::Input(format!("delimiter '{}' is not ASCII", self.delimiter)))
    }
}

/// Loads a configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> CliResult<DicurveConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Ok(DicurveConfig::from_file(path)?)
        }
        None => Ok(DicurveConfig::default()),
    }
}
