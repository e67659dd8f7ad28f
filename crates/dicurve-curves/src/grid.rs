//! Output maturity grids.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// A fixed, strictly increasing set of maturities (in days) on which every
/// fitted curve is evaluated, independent of where the observations fell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CurveGrid {
    points: Vec<f64>,
}

impl CurveGrid {
    /// Creates a grid from explicit points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidGrid`] if the points are empty,
    /// non-finite, not positive, or not strictly increasing.
    pub fn new(points: Vec<f64>) -> CurveResult<Self> {
        if points.is_empty() {
            return Err(CurveError::invalid_grid("grid has no points"));
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(CurveError::invalid_grid(format!("non-finite grid point {p}")));
        }
        if let Some(p) = points.iter().find(|&&p| p <= 0.0) {
            return Err(CurveError::invalid_grid(format!(
                "grid maturities must be positive, got {p}"
            )));
        }
        if let Some(i) = points.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::invalid_grid(format!(
                "grid must be strictly increasing: {} then {}",
                points[i],
                points[i + 1]
            )));
        }
        Ok(Self { points })
    }

    /// `points` evenly spaced maturities from `start` to `end` inclusive.
    ///
    /// A single point yields `[start]`.
    pub fn linspace(start: f64, end: f64, points: usize) -> CurveResult<Self> {
        if points == 0 {
            return Err(CurveError::invalid_grid("grid needs at least one point"));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(CurveError::invalid_grid(format!(
                "grid bounds must be finite: [{start}, {end}]"
            )));
        }
        if points == 1 {
            return Self::new(vec![start]);
        }
        if end <= start {
            return Err(CurveError::invalid_grid(format!(
                "grid end {end} must exceed start {start}"
            )));
        }

        Self::new(spaced(start, end, points))
    }

    /// Grid used for linear interpolation: 5 to 3000 days, 100 points.
    pub fn linear_default() -> Self {
        Self {
            points: spaced(5.0, 3000.0, 100),
        }
    }

    /// Grid used for Svensson fits: 180 to 3000 days, 100 points.
    pub fn svensson_default() -> Self {
        Self {
            points: spaced(180.0, 3000.0, 100),
        }
    }

    /// The grid maturities.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the grid has no points; validated grids never do.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest maturity.
    pub fn first(&self) -> f64 {
        self.points[0]
    }

    /// Largest maturity.
    pub fn last(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Returns true if every grid point lies within `[min, max]`.
    pub fn within(&self, min: f64, max: f64) -> bool {
        self.first() >= min && self.last() <= max
    }

    /// The first grid point outside `[min, max]`, if any.
    pub fn first_outside(&self, min: f64, max: f64) -> Option<f64> {
        self.points.iter().copied().find(|&p| p < min || p > max)
    }

    /// The sub-grid inside `[min, max]`, or `None` if no point falls inside.
    pub fn restrict_to(&self, min: f64, max: f64) -> Option<Self> {
        let points: Vec<f64> = self
            .points
            .iter()
            .copied()
            .filter(|&p| p >= min && p <= max)
            .collect();
        (!points.is_empty()).then_some(Self { points })
    }
}

/// Evenly spaced values, `points >= 2`, `end > start`.
fn spaced(start: f64, end: f64, points: usize) -> Vec<f64> {
    let step = (end - start) / (points - 1) as f64;
    let mut values: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    // Pin the end so it matches the configured bound exactly
    values[points - 1] = end;
    values
}

impl TryFrom<Vec<f64>> for CurveGrid {
    type Error = CurveError;

    fn try_from(points: Vec<f64>) -> CurveResult<Self> {
        Self::new(points)
    }
}

impl From<CurveGrid> for Vec<f64> {
    fn from(grid: CurveGrid) -> Self {
        grid.points
    }
}
