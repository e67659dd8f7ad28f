//! CLI error types.

use chrono::NaiveDate;
use dicurve_curves::CurveError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date: '{0}'. Use YYYY-MM-DD or DD/MM/YYYY.")]
    InvalidDate(String),

    /// Unparseable number in the input.
    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        /// 1-based line in the input file.
        line: u64,
        /// Column name.
        field: &'static str,
        /// Raw text.
        value: String,
    },

    /// Input file has the wrong shape.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The requested date has no observations.
    #[error("No observations for {0}")]
    DateNotFound(NaiveDate),

    /// Curve fitting or configuration error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
