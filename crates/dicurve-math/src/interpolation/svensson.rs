//! Svensson parametric term-structure model.
//!
//! The model is written in rate form, with decay rates `λ` multiplying the
//! maturity (as in ANBIMA's published methodology) rather than decay times
//! dividing it:
//!
//! ```text
//! y(t) = β₀ + β₁ · (1 - e^(-tλ₁)) / (tλ₁)
//!           + β₂ · [(1 - e^(-tλ₁)) / (tλ₁) - e^(-tλ₁)]
//!           + β₃ · [(1 - e^(-tλ₂)) / (tλ₂) - e^(-tλ₂)]
//! ```
//!
//! The units of `t` and `λ` only have to agree with each other; dicurve
//! feeds maturities in calendar days.

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Svensson yield curve model.
///
/// - β₀: long-run level (limit as t → ∞)
/// - β₁: slope; β₀ + β₁ is the limit as t → 0
/// - β₂, β₃: curvature humps
/// - λ₁, λ₂: decay rates of the two humps (non-zero)
///
/// # Example
///
/// ```rust
/// use dicurve_math::interpolation::{Interpolator, Svensson};
///
/// let sv = Svensson::new(0.12, -0.02, 0.01, 0.005, 0.004, 0.0015).unwrap();
///
/// let short = sv.interpolate(21.0).unwrap();
/// let long = sv.interpolate(2520.0).unwrap();
/// assert!(short < long);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Svensson {
    beta0: f64,
    beta1: f64,
    beta2: f64,
    beta3: f64,
    lambda1: f64,
    lambda2: f64,
}

impl Svensson {
    /// Number of free parameters in the model.
    pub const PARAMETER_COUNT: usize = 6;

    /// Creates a new Svensson curve.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is non-finite or if either decay
    /// rate is zero (the loadings divide by `tλ`).
    pub fn new(
        beta0: f64,
        beta1: f64,
        beta2: f64,
        beta3: f64,
        lambda1: f64,
        lambda2: f64,
    ) -> MathResult<Self> {
        Self::from_array([beta0, beta1, beta2, beta3, lambda1, lambda2])
    }

    /// Creates a curve from `[β₀, β₁, β₂, β₃, λ₁, λ₂]`.
    pub fn from_array(params: [f64; 6]) -> MathResult<Self> {
        if let Some(i) = params.iter().position(|p| !p.is_finite()) {
            return Err(MathError::invalid_input(format!(
                "Svensson parameter {i} is not finite: {}",
                params[i]
            )));
        }
        let [beta0, beta1, beta2, beta3, lambda1, lambda2] = params;
        if lambda1 == 0.0 {
            return Err(MathError::DivisionByZero { value: lambda1 });
        }
        if lambda2 == 0.0 {
            return Err(MathError::DivisionByZero { value: lambda2 });
        }

        Ok(Self {
            beta0,
            beta1,
            beta2,
            beta3,
            lambda1,
            lambda2,
        })
    }

    /// Returns the model parameters as `[β₀, β₁, β₂, β₃, λ₁, λ₂]`.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.beta0,
            self.beta1,
            self.beta2,
            self.beta3,
            self.lambda1,
            self.lambda2,
        ]
    }

    /// Returns the model parameters as (β₀, β₁, β₂, β₃, λ₁, λ₂).
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.beta0,
            self.beta1,
            self.beta2,
            self.beta3,
            self.lambda1,
            self.lambda2,
        )
    }

    /// Evaluates the model for raw parameters without validating them.
    ///
    /// This is the least-squares objective's inner loop, so nothing is
    /// checked: at `tλ = 0` the loadings take their limits and the value
    /// stays finite, while an overflowing `e^(-tλ)` yields a non-finite value
    /// that the solver treats as a rejected step.
    pub fn evaluate(t: f64, params: &[f64]) -> f64 {
        debug_assert_eq!(params.len(), Self::PARAMETER_COUNT);
        let x1 = t * params[4];
        let x2 = t * params[5];
        params[0]
            + params[1] * loading_slope(x1)
            + params[2] * loading_curvature(x1)
            + params[3] * loading_curvature(x2)
    }

    /// Returns the instantaneous forward rate at maturity t.
    ///
    /// ```text
    /// f(t) = β₀ + β₁·e^(-tλ₁) + β₂·tλ₁·e^(-tλ₁) + β₃·tλ₂·e^(-tλ₂)
    /// ```
    pub fn forward_rate(&self, t: f64) -> f64 {
        let x1 = t * self.lambda1;
        let x2 = t * self.lambda2;
        let exp_x1 = (-x1).exp();
        let exp_x2 = (-x2).exp();

        self.beta0 + self.beta1 * exp_x1 + self.beta2 * x1 * exp_x1 + self.beta3 * x2 * exp_x2
    }

    fn check_maturity(t: f64) -> MathResult<()> {
        if t.is_finite() && t > 0.0 {
            Ok(())
        } else {
            Err(MathError::invalid_input(format!(
                "Svensson model is undefined at maturity {t}"
            )))
        }
    }
}

/// (1 - e^(-x)) / x
fn loading_slope(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        1.0 - x / 2.0 + x * x / 6.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// (1 - e^(-x)) / x - e^(-x)
fn loading_curvature(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        x / 2.0 - x * x / 3.0
    } else {
        loading_slope(x) - (-x).exp()
    }
}

/// d/dx of [`loading_slope`].
fn loading_slope_dx(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        -0.5 + x / 3.0
    } else {
        ((-x).exp() - loading_slope(x)) / x
    }
}

impl Interpolator for Svensson {
    fn interpolate(&self, t: f64) -> MathResult<f64> {
        Self::check_maturity(t)?;
        Ok(Self::evaluate(t, &self.to_array()))
    }

    fn derivative(&self, t: f64) -> MathResult<f64> {
        Self::check_maturity(t)?;

        let x1 = t * self.lambda1;
        let x2 = t * self.lambda2;

        // d(curvature)/dx = d(slope)/dx + e^(-x)
        let ds1 = loading_slope_dx(x1);
        let dc1 = ds1 + (-x1).exp();
        let dc2 = loading_slope_dx(x2) + (-x2).exp();

        Ok(self.lambda1 * (self.beta1 * ds1 + self.beta2 * dc1) + self.lambda2 * self.beta3 * dc2)
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }

    fn min_x(&self) -> f64 {
        0.0
    }

    fn max_x(&self) -> f64 {
        f64::INFINITY
    }

    fn in_range(&self, x: f64) -> bool {
        x > 0.0 && x.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn typical() -> Svensson {
        // Upward-sloping DI curve in decimal rates, maturities in days
        Svensson::new(0.13, -0.025, 0.01, -0.004, 0.004, 0.0012).unwrap()
    }

    #[test]
    fn test_svensson_asymptotic() {
        let sv = typical();

        // As t → ∞, y(t) → β₀
        let long_rate = sv.interpolate(1_000_000.0).unwrap();
        assert_relative_eq!(long_rate, 0.13, epsilon = 1e-4);
    }

    #[test]
    fn test_svensson_short_rate() {
        let sv = typical();

        // As t → 0, y(t) → β₀ + β₁
        let short_rate = sv.interpolate(1e-6).unwrap();
        assert_relative_eq!(short_rate, 0.13 - 0.025, epsilon = 1e-6);
    }

    #[test]
    fn test_formula_matches_closed_form() {
        let (b0, b1, b2, b3, l1, l2) = (0.1, 0.1, 0.1, 0.1, 1.0, 1.0);
        let sv = Svensson::new(b0, b1, b2, b3, l1, l2).unwrap();

        let t: f64 = 2.0;
        let e1 = (-t * l1).exp();
        let e2 = (-t * l2).exp();
        let expected = b0
            + b1 * (1.0 - e1) / (t * l1)
            + b2 * ((1.0 - e1) / (t * l1) - e1)
            + b3 * ((1.0 - e2) / (t * l2) - e2);

        assert_relative_eq!(sv.interpolate(t).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_beta3_is_nelson_siegel() {
        let sv = Svensson::new(0.12, -0.02, 0.015, 0.0, 0.003, 0.0007).unwrap();
        let other = Svensson::new(0.12, -0.02, 0.015, 0.0, 0.003, 0.05).unwrap();

        for t in [30.0, 252.0, 720.0, 1800.0] {
            assert_relative_eq!(
                sv.interpolate(t).unwrap(),
                other.interpolate(t).unwrap(),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_undefined_at_zero_maturity() {
        let sv = typical();
        assert!(sv.interpolate(0.0).is_err());
        assert!(sv.interpolate(-5.0).is_err());
        assert!(sv.derivative(0.0).is_err());
        assert!(!sv.in_range(0.0));
    }

    #[test]
    fn test_zero_lambda_rejected() {
        assert!(matches!(
            Svensson::new(0.1, 0.1, 0.1, 0.1, 0.0, 1.0),
            Err(MathError::DivisionByZero { .. })
        ));
        assert!(Svensson::new(0.1, 0.1, 0.1, 0.1, 1.0, 0.0).is_err());
        assert!(Svensson::new(f64::NAN, 0.1, 0.1, 0.1, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_negative_lambda_allowed() {
        // No sign constraints: a least-squares fit may land anywhere
        let sv = Svensson::new(0.1, 0.02, -0.01, 0.0, -0.001, 0.5).unwrap();
        assert!(sv.interpolate(100.0).unwrap().is_finite());
    }

    #[test]
    fn test_evaluate_uses_limits_at_zero() {
        // slope loading → 1, curvature loadings → 0
        let v = Svensson::evaluate(10.0, &[0.1, 0.2, 0.3, 0.4, 0.0, 0.0]);
        assert_relative_eq!(v, 0.3, epsilon = 1e-15);
        let v = Svensson::evaluate(0.0, &[0.1, 0.2, 0.3, 0.4, 1.0, 1.0]);
        assert_relative_eq!(v, 0.3, epsilon = 1e-15);
    }

    #[test]
    fn test_svensson_derivative() {
        let sv = typical();

        let t = 500.0;
        let h = 1e-3;
        let numerical = (sv.interpolate(t + h).unwrap() - sv.interpolate(t - h).unwrap()) / (2.0 * h);

        assert_relative_eq!(sv.derivative(t).unwrap(), numerical, epsilon = 1e-10);
    }

    #[test]
    fn test_forward_rate_limits() {
        let sv = typical();
        assert_relative_eq!(sv.forward_rate(1e7), 0.13, epsilon = 1e-9);
        assert_relative_eq!(sv.forward_rate(0.0), 0.13 - 0.025, epsilon = 1e-15);
    }

    #[test]
    fn test_array_round_trip() {
        let params = [0.08, -0.02, 0.01, 0.005, 1.5, 3.0];
        let sv = Svensson::from_array(params).unwrap();
        assert_eq!(sv.to_array(), params);
    }
}
