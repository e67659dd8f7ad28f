//! Interpolation methods for term-structure resampling.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: piecewise-linear interpolation through the
//!   observed points, no extrapolation unless asked for
//! - [`Svensson`]: six-parameter parametric curve, defined for every
//!   positive maturity
//!
//! | Method | Smoothness | Passes through data | Extrapolates |
//! |--------|------------|---------------------|--------------|
//! | Linear | C0 | Yes | Opt-in |
//! | Svensson | C∞ | No (least-squares fit) | Yes |

mod linear;
mod svensson;

pub use linear::LinearInterpolator;
pub use svensson::Svensson;

use crate::error::MathResult;

/// Trait for interpolation methods.
///
/// Both the data-driven and the parametric curves implement this, so the
/// fitters can evaluate either one on an output grid the same way.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns true if extrapolation is allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_basic() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 1.5, epsilon = 1e-10);
    }

    #[test]
    fn test_derivative_consistency() {
        let days = vec![21.0, 63.0, 126.0, 252.0, 504.0];
        let rates = vec![10.40, 10.55, 10.90, 11.45, 12.10];

        let linear = LinearInterpolator::new(days, rates).unwrap();
        check_derivative(&linear, 200.0, "Linear");

        let sv = Svensson::new(0.12, -0.02, 0.01, 0.005, 0.004, 0.0015).unwrap();
        check_derivative(&sv, 400.0, "Svensson");
    }

    fn check_derivative(interp: &dyn Interpolator, t: f64, name: &str) {
        let h = 1e-4;
        let y_plus = interp.interpolate(t + h).unwrap();
        let y_minus = interp.interpolate(t - h).unwrap();
        let numerical = (y_plus - y_minus) / (2.0 * h);

        let analytical = interp.derivative(t).unwrap();

        assert!(
            (analytical - numerical).abs() < 1e-7,
            "{} derivative at t={}: analytical={}, numerical={}",
            name,
            t,
            analytical,
            numerical
        );
    }

    #[test]
    fn test_linear_matches_svensson_at_nodes() {
        // A linear interpolant built on Svensson samples reproduces them exactly
        let sv = Svensson::new(0.11, -0.015, 0.02, -0.01, 0.003, 0.0008).unwrap();
        let days: Vec<f64> = (1..=10).map(|i| f64::from(i) * 180.0).collect();
        let rates: Vec<f64> = days.iter().map(|&t| sv.interpolate(t).unwrap()).collect();

        let linear = LinearInterpolator::new(days.clone(), rates.clone()).unwrap();
        for (t, r) in days.iter().zip(rates.iter()) {
            assert_relative_eq!(linear.interpolate(*t).unwrap(), *r, epsilon = 1e-12);
        }
    }
}
