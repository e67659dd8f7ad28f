//! Error types for curve fitting and series assembly.
//!
//! Only contract violations and unusable inputs are errors. A Svensson fit
//! that fails to converge is not: it comes back as
//! [`FittedCurve::Empty`](crate::FittedCurve::Empty) so a batch can skip the
//! date and carry on.

use chrono::NaiveDate;
use dicurve_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Fewer usable observations than the fitter needs.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum required observations.
        required: usize,
        /// Usable observations supplied.
        actual: usize,
    },

    /// A grid point lies outside the observed maturity range.
    #[error("Maturity {maturity:.4} out of observed range [{min:.4}, {max:.4}]")]
    OutOfRange {
        /// The offending grid maturity.
        maturity: f64,
        /// Smallest observed maturity.
        min: f64,
        /// Largest observed maturity.
        max: f64,
    },

    /// The observation set has the wrong shape or non-finite values.
    #[error("Malformed input: {reason}")]
    MalformedInput {
        /// Description of the problem.
        reason: String,
    },

    /// The output grid is empty, unsorted or non-finite.
    #[error("Invalid grid: {reason}")]
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },

    /// Model parameters violate the model's domain.
    #[error("Invalid parameters: {reason}")]
    InvalidParameters {
        /// Description of the problem.
        reason: String,
    },

    /// A date was added twice under the reject policy.
    #[error("Duplicate date in curve series: {date}")]
    DuplicateDate {
        /// The repeated date.
        date: NaiveDate,
    },

    /// Configuration could not be read or is inconsistent.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Error from the numerical kernels.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl CurveError {
    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates an out of range error.
    #[must_use]
    pub fn out_of_range(maturity: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange { maturity, min, max }
    }

    /// Creates a malformed input error.
    #[must_use]
    pub fn malformed_input(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Creates an invalid grid error.
    #[must_use]
    pub fn invalid_grid(reason: impl Into<String>) -> Self {
        Self::InvalidGrid {
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameters error.
    #[must_use]
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if a batch should skip the date instead of aborting.
    ///
    /// Only too few observations counts: that is a property of one day's
    /// market data. A strict-policy `OutOfRange` aborts like any other error;
    /// [`RangePolicy::Skip`](crate::fitters::RangePolicy::Skip) and `Truncate`
    /// handle short-dated grids per date.
    pub fn is_data_dependent(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
