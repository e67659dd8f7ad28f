//! Piecewise-linear interpolation.

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Linear interpolation between observed nodes.
///
/// Consecutive `(maturity, rate)` nodes are joined by straight lines. Queries
/// outside `[xs[0], xs[n-1]]` fail with
/// [`MathError::ExtrapolationNotAllowed`] unless extrapolation was enabled.
///
/// # Example
///
/// ```rust
/// use dicurve_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let days = vec![100.0, 200.0, 300.0];
/// let rates = vec![5.0, 6.0, 7.0];
///
/// let interp = LinearInterpolator::new(days, rates).unwrap();
/// assert_eq!(interp.interpolate(150.0).unwrap(), 5.5);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - Node abscissae, strictly increasing
    /// * `ys` - Node values
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, if lengths differ,
    /// or if `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() < 2 {
            return Err(MathError::insufficient_data(2, xs.len()));
        }
        if xs.len() != ys.len() {
            return Err(MathError::invalid_input(format!(
                "xs and ys must have same length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }

        if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(MathError::invalid_input(format!(
                "x values must be strictly increasing (index {})",
                i + 1
            )));
        }

        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    fn check_range(&self, x: f64) -> MathResult<()> {
        if !self.allow_extrapolation && !self.in_range(x) {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }
        Ok(())
    }

    /// Finds the index i such that xs[i] <= x < xs[i+1].
    fn find_segment(&self, x: f64) -> usize {
        let last = self.xs.len() - 2;
        match self.xs.binary_search_by(|probe| probe.total_cmp(&x)) {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        }
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;

        let i = self.find_segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        // Exact at the nodes, no rounding from the weight
        if x == x0 {
            return Ok(y0);
        }
        if x == x1 {
            return Ok(y1);
        }

        let t = (x - x0) / (x1 - x0);
        Ok(y0 + t * (y1 - y0))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;

        let i = self.find_segment(x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_interpolation() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 2.0, 4.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        // Test at exact points
        assert_relative_eq!(interp.interpolate(0.0).unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(1.0).unwrap(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), 4.0, epsilon = 1e-10);

        // Test interpolation
        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_midpoints_are_exact() {
        let interp =
            LinearInterpolator::new(vec![100.0, 200.0, 300.0], vec![5.0, 6.0, 7.0]).unwrap();

        assert_eq!(interp.interpolate(150.0).unwrap(), 5.5);
        assert_eq!(interp.interpolate(250.0).unwrap(), 6.5);
    }

    #[test]
    fn test_extrapolation_disabled() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        assert!(matches!(
            interp.interpolate(-0.5),
            Err(MathError::ExtrapolationNotAllowed { .. })
        ));
        assert!(interp.interpolate(2.5).is_err());
        assert!(interp.derivative(2.5).is_err());
    }

    #[test]
    fn test_extrapolation_enabled() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];

        let interp = LinearInterpolator::new(xs, ys)
            .unwrap()
            .with_extrapolation();

        assert!(interp.allows_extrapolation());
        assert_relative_eq!(interp.interpolate(-1.0).unwrap(), -1.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(3.0).unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_insufficient_points() {
        let err = LinearInterpolator::new(vec![0.0], vec![1.0]).unwrap_err();
        assert_eq!(err, MathError::insufficient_data(2, 1));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(LinearInterpolator::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_unsorted_error() {
        let xs = vec![1.0, 0.0, 2.0];
        let ys = vec![1.0, 0.0, 2.0];

        assert!(LinearInterpolator::new(xs, ys).is_err());
    }

    #[test]
    fn test_repeated_node_rejected() {
        assert!(LinearInterpolator::new(vec![1.0, 1.0, 2.0], vec![1.0, 1.5, 2.0]).is_err());
    }

    mod properties {
        use crate::interpolation::{Interpolator, LinearInterpolator};
        use proptest::prelude::*;

        fn nodes() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
            prop::collection::vec((0.5..50.0f64, -5.0..20.0f64), 2..20).prop_map(|steps| {
                let mut x = 0.0;
                steps
                    .into_iter()
                    .map(|(dx, y)| {
                        x += dx;
                        (x, y)
                    })
                    .unzip()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_reproduces_nodes((xs, ys) in nodes()) {
                let interp = LinearInterpolator::new(xs.clone(), ys.clone()).unwrap();
                for (x, y) in xs.iter().zip(&ys) {
                    prop_assert!((interp.interpolate(*x).unwrap() - y).abs() < 1e-9);
                }
            }

            #[test]
            fn prop_stays_within_node_values((xs, ys) in nodes(), frac in 0.0..=1.0f64) {
                let interp = LinearInterpolator::new(xs.clone(), ys.clone()).unwrap();
                let last = xs[xs.len() - 1];
                let x = (xs[0] + frac * (last - xs[0])).min(last);
                let lo = ys.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let y = interp.interpolate(x).unwrap();
                prop_assert!(y >= lo - 1e-9 && y <= hi + 1e-9);
            }
        }
    }
}
