//! Curve fitters.
//!
//! A fitter turns one date's [`ObservationSet`] into a [`FittedCurve`]
//! sampled on a [`CurveGrid`]. Two are provided:
//!
//! - [`LinearCurveFitter`]: piecewise-linear interpolation between observed
//!   maturities, never extrapolating
//! - [`SvenssonCurveFitter`]: nonlinear least-squares fit of the Svensson
//!   model, evaluated anywhere on the grid
//!
//! Both implement [`CurveFitter`], so batch code can hold either behind a
//! `Box<dyn CurveFitter>`.

mod linear;
mod svensson;

pub use linear::{LinearCurveFitter, RangePolicy};
pub use svensson::{
    Calibration, SvenssonConfig, SvenssonCurveFitter, SvenssonFit, SvenssonParameters,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::fitted::FittedCurve;
use crate::grid::CurveGrid;
use crate::observation::ObservationSet;

/// Fits one date's observations onto a grid.
///
/// Implementations must be deterministic and free of shared mutable state;
/// the batch runner calls `fit` from several threads at once.
pub trait CurveFitter: Send + Sync {
    /// Short method name used in logs.
    fn name(&self) -> &'static str;

    /// Fits `observations` and evaluates the result on `grid`.
    ///
    /// # Errors
    ///
    /// Returns an error for unusable input (too few points, grid outside
    /// the data under a strict policy, malformed values). A fit that simply
    /// fails to converge is returned as [`FittedCurve::Empty`].
    fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve>;
}

impl<F: CurveFitter + ?Sized> CurveFitter for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        (**self).fit(observations, grid)
    }
}

/// Curve fitting method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Piecewise-linear interpolation.
    Linear,
    /// Svensson least-squares fit.
    #[default]
    Svensson,
}

impl FitMethod {
    /// All methods.
    pub const ALL: [FitMethod; 2] = [FitMethod::Linear, FitMethod::Svensson];

    /// The grid conventionally used with this method.
    pub fn default_grid(self) -> CurveGrid {
        match self {
            Self::Linear => CurveGrid::linear_default(),
            Self::Svensson => CurveGrid::svensson_default(),
        }
    }

    /// Builds a fitter with default settings.
    pub fn fitter(self) -> Box<dyn CurveFitter> {
        match self {
            Self::Linear => Box::new(LinearCurveFitter::default()),
            Self::Svensson => Box::new(SvenssonCurveFitter::default()),
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Svensson => write!(f, "svensson"),
        }
    }
}

impl FromStr for FitMethod {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "svensson" => Ok(Self::Svensson),
            other => Err(CurveError::config(format!(
                "unknown fit method '{other}', expected 'linear' or 'svensson'"
            ))),
        }
    }
}
