//! The result of fitting one date's observations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::grid::CurveGrid;

/// Why a fitter produced no curve for a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The least-squares solver stopped without converging.
    NotConverged {
        /// Iterations used.
        iterations: usize,
        /// Residual sum of squares at the last accepted parameters.
        residual: f64,
    },
    /// Enough observations, but too few distinct maturities to identify the
    /// model.
    DegenerateObservations {
        /// Distinct maturities available.
        distinct: usize,
    },
    /// The solver returned parameters outside the model's domain (non-finite
    /// values or a zero decay rate).
    NonFiniteParameters,
    /// The output grid reaches outside the observed maturities and the
    /// linear fitter is configured to skip such dates.
    OutOfRange {
        /// Smallest observed maturity.
        min: f64,
        /// Largest observed maturity.
        max: f64,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConverged {
                iterations,
                residual,
            } => write!(
                f,
                "fit did not converge after {iterations} iterations (residual {residual:.2e})"
            ),
            Self::DegenerateObservations { distinct } => {
                write!(f, "only {distinct} distinct maturities")
            }
            Self::NonFiniteParameters => write!(f, "fitted parameters are not usable"),
            Self::OutOfRange { min, max } => {
                write!(f, "grid extends outside observed maturities [{min}, {max}]")
            }
        }
    }
}

/// A curve resampled on a grid, or an explicit "no curve for this date".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FittedCurve {
    /// One value per grid point.
    Fitted {
        /// Maturities the curve was evaluated at.
        grid: CurveGrid,
        /// Curve values, `values.len() == grid.len()`.
        values: Vec<f64>,
    },
    /// No curve; the date should be skipped.
    Empty(SkipReason),
}

impl FittedCurve {
    /// Creates a fitted curve, checking that there is one value per grid
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::MalformedInput`] on a length mismatch.
    pub fn new(grid: CurveGrid, values: Vec<f64>) -> CurveResult<Self> {
        if grid.len() != values.len() {
            return Err(CurveError::malformed_input(format!(
                "{} values for {} grid points",
                values.len(),
                grid.len()
            )));
        }
        Ok(Self::Fitted { grid, values })
    }

    /// Creates an empty curve.
    pub fn empty(reason: SkipReason) -> Self {
        Self::Empty(reason)
    }

    /// Returns true for the "no curve" marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Number of points; zero for an empty curve.
    pub fn len(&self) -> usize {
        match self {
            Self::Fitted { values, .. } => values.len(),
            Self::Empty(_) => 0,
        }
    }

    /// The grid, if fitted.
    pub fn grid(&self) -> Option<&CurveGrid> {
        match self {
            Self::Fitted { grid, .. } => Some(grid),
            Self::Empty(_) => None,
        }
    }

    /// The values; empty for an empty curve.
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Fitted { values, .. } => values,
            Self::Empty(_) => &[],
        }
    }

    /// Why the curve is empty, if it is.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Fitted { .. } => None,
            Self::Empty(reason) => Some(*reason),
        }
    }

    /// Iterates over `(maturity, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let maturities = self.grid().map_or(&[][..], CurveGrid::points);
        maturities.iter().copied().zip(self.values().iter().copied())
    }

    /// Value at a grid maturity (exact match only).
    pub fn value_at(&self, maturity: f64) -> Option<f64> {
        self.points().find(|&(m, _)| m == maturity).map(|(_, v)| v)
    }
}
