//! Linear interpolation fitter.

use dicurve_math::interpolation::{Interpolator, LinearInterpolator};
use log::debug;
use serde::{Deserialize, Serialize};

use super::CurveFitter;
use crate::error::{CurveError, CurveResult};
use crate::fitted::{FittedCurve, SkipReason};
use crate::grid::CurveGrid;
use crate::observation::{DuplicateMaturityPolicy, ObservationSet};

/// What to do with grid points outside the observed maturity range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Fail with [`CurveError::OutOfRange`].
    #[default]
    Strict,
    /// Evaluate only the grid points inside the observed range.
    Truncate,
    /// Return [`FittedCurve::Empty`] so the date is skipped.
    Skip,
}

/// Piecewise-linear interpolation of the observed rates.
///
/// Observations are sorted by maturity and repeated maturities collapsed
/// before interpolating. The fitter never extrapolates; grid points outside
/// the observed range are handled by the [`RangePolicy`].
///
/// # Example
///
/// ```rust
/// use dicurve_curves::prelude::*;
///
/// let obs = ObservationSet::from_pairs([(100.0, 5.0), (200.0, 6.0), (300.0, 7.0)]).unwrap();
/// let grid = CurveGrid::new(vec![150.0, 250.0]).unwrap();
///
/// let curve = LinearCurveFitter::new().fit(&obs, &grid).unwrap();
/// assert_eq!(curve.values(), &[5.5, 6.5]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearCurveFitter {
    /// Handling of grid points outside the observed range.
    pub range_policy: RangePolicy,
    /// How repeated maturities are merged.
    pub duplicate_policy: DuplicateMaturityPolicy,
}

impl LinearCurveFitter {
    /// Creates a fitter with the strict range policy and averaged duplicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the range policy.
    #[must_use]
    pub fn with_range_policy(mut self, range_policy: RangePolicy) -> Self {
        self.range_policy = range_policy;
        self
    }

    /// Sets the duplicate maturity policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicateMaturityPolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    /// Fits the observations onto `grid`.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InsufficientData`] with fewer than 2 distinct
    ///   maturities, or when truncation leaves no grid point
    /// - [`CurveError::OutOfRange`] under [`RangePolicy::Strict`] when a grid
    ///   point lies outside the observed maturities
    pub fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        let (maturities, rates) = observations.sorted_deduplicated(self.duplicate_policy);
        if maturities.len() < 2 {
            return Err(CurveError::insufficient_data(2, maturities.len()));
        }
        let min = maturities[0];
        let max = maturities[maturities.len() - 1];

        let target = match grid.first_outside(min, max) {
            None => grid.clone(),
            Some(maturity) => match self.range_policy {
                RangePolicy::Strict => return Err(CurveError::out_of_range(maturity, min, max)),
                RangePolicy::Skip => {
                    debug!("linear fit skipped: grid point {maturity} outside [{min}, {max}]");
                    return Ok(FittedCurve::empty(SkipReason::OutOfRange { min, max }));
                }
                RangePolicy::Truncate => grid
                    .restrict_to(min, max)
                    .ok_or_else(|| CurveError::insufficient_data(1, 0))?,
            },
        };

        let interpolator = LinearInterpolator::new(maturities, rates)?;
        let values = target
            .points()
            .iter()
            .map(|&t| interpolator.interpolate(t))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "linear fit: {} observations onto {} grid points",
            observations.len(),
            target.len()
        );
        FittedCurve::new(target, values)
    }
}

impl CurveFitter for LinearCurveFitter {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        LinearCurveFitter::fit(self, observations, grid)
    }
}
