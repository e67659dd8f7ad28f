//! Svensson least-squares fitter.
//!
//! The six model parameters are found by minimising the squared distance
//! between the model and every observation with Levenberg-Marquardt, seeded
//! at a configurable initial guess and without bounds. The fitted model is
//! then evaluated on the output grid, which may extend beyond the observed
//! maturities.

use dicurve_math::interpolation::{Interpolator, Svensson};
use dicurve_math::optimization::{LevenbergMarquardt, LmConfig, Termination};
use log::debug;
use serde::{Deserialize, Serialize};

use super::CurveFitter;
use crate::error::{CurveError, CurveResult};
use crate::fitted::{FittedCurve, SkipReason};
use crate::grid::CurveGrid;
use crate::observation::ObservationSet;

/// Svensson parameters `(β₀, β₁, β₂, β₃, λ₁, λ₂)`.
///
/// Decay rates multiply the maturity, so with maturities in days they are
/// per-day rates. No sign or magnitude constraints apply; only `λ = 0` is
/// outside the model's domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvenssonParameters {
    /// Long-run level.
    pub beta0: f64,
    /// Slope.
    pub beta1: f64,
    /// First curvature.
    pub beta2: f64,
    /// Second curvature.
    pub beta3: f64,
    /// Decay rate of the slope and first curvature terms.
    pub lambda1: f64,
    /// Decay rate of the second curvature term.
    pub lambda2: f64,
}

impl Default for SvenssonParameters {
    fn default() -> Self {
        Self {
            beta0: 0.1,
            beta1: 0.1,
            beta2: 0.1,
            beta3: 0.1,
            lambda1: 1.0,
            lambda2: 1.0,
        }
    }
}

impl SvenssonParameters {
    /// Creates parameters from `[β₀, β₁, β₂, β₃, λ₁, λ₂]`.
    pub fn from_array(params: [f64; 6]) -> Self {
        let [beta0, beta1, beta2, beta3, lambda1, lambda2] = params;
        Self {
            beta0,
            beta1,
            beta2,
            beta3,
            lambda1,
            lambda2,
        }
    }

    /// Returns `[β₀, β₁, β₂, β₃, λ₁, λ₂]`.
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

    /// Builds the model.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] if a parameter is non-finite
    /// or a decay rate is zero.
    pub fn model(&self) -> CurveResult<Svensson> {
        Svensson::from_array(self.to_array())
            .map_err(|e| CurveError::invalid_parameters(format!("{self}: {e}")))
    }

    /// Model value at maturity `t` without validation.
    pub fn evaluate(&self, t: f64) -> f64 {
        Svensson::evaluate(t, &self.to_array())
    }
}

impl From<[f64; 6]> for SvenssonParameters {
    fn from(params: [f64; 6]) -> Self {
        Self::from_array(params)
    }
}

impl From<SvenssonParameters> for [f64; 6] {
    fn from(params: SvenssonParameters) -> Self {
        params.to_array()
    }
}

impl std::fmt::Display for SvenssonParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "β=({:.6}, {:.6}, {:.6}, {:.6}) λ=({:.6}, {:.6})",
            self.beta0, self.beta1, self.beta2, self.beta3, self.lambda1, self.lambda2
        )
    }
}

/// Settings for [`SvenssonCurveFitter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvenssonConfig {
    /// Starting point of the least-squares search.
    pub initial_guess: SvenssonParameters,
    /// Solver iteration budget and tolerances.
    pub solver: LmConfig,
}

/// A converged Svensson calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvenssonFit {
    /// Fitted parameters.
    pub parameters: SvenssonParameters,
    /// Residual sum of squares at the fitted parameters.
    pub residual_ss: f64,
    /// Root mean square residual per observation.
    pub rmse: f64,
    /// Solver iterations used.
    pub iterations: usize,
}

/// Outcome of [`SvenssonCurveFitter::calibrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    /// The solver converged to usable parameters.
    Fitted(SvenssonFit),
    /// No usable parameters; the date should be skipped.
    Skipped(SkipReason),
}

impl Calibration {
    /// The fit, if the calibration succeeded.
    pub fn fit(&self) -> Option<&SvenssonFit> {
        match self {
            Self::Fitted(fit) => Some(fit),
            Self::Skipped(_) => None,
        }
    }

    /// Evaluates the calibrated model on `grid`.
    ///
    /// A skipped calibration, or a model that is not finite somewhere on the
    /// grid, gives an empty curve.
    pub fn curve(&self, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        let fit = match self {
            Self::Fitted(fit) => fit,
            Self::Skipped(reason) => return Ok(FittedCurve::empty(*reason)),
        };

        let model = fit.parameters.model()?;
        let values = grid
            .points()
            .iter()
            .map(|&t| model.interpolate(t))
            .collect::<Result<Vec<_>, _>>()?;

        if values.iter().any(|v| !v.is_finite()) {
            debug!("svensson fit skipped: non-finite value on grid for {}", fit.parameters);
            return Ok(FittedCurve::empty(SkipReason::NonFiniteParameters));
        }

        FittedCurve::new(grid.clone(), values)
    }
}

/// Nonlinear least-squares Svensson fitter.
///
/// # Example
///
/// ```rust
/// use dicurve_curves::prelude::*;
///
/// let truth = SvenssonParameters::from_array([0.08, -0.02, 0.01, 0.005, 1.5, 3.0]);
/// let obs = ObservationSet::from_pairs(
///     (1..=8).map(|i| {
///         let t = 100.0 * f64::from(i);
///         (t, truth.evaluate(t))
///     }),
/// )
/// .unwrap();
///
/// let curve = SvenssonCurveFitter::new()
///     .fit(&obs, &CurveGrid::new(vec![150.0, 450.0]).unwrap())
///     .unwrap();
/// assert!(!curve.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SvenssonCurveFitter {
    config: SvenssonConfig,
}

impl SvenssonCurveFitter {
    /// Minimum number of observations, one per parameter.
    pub const MIN_OBSERVATIONS: usize = Svensson::PARAMETER_COUNT;

    /// Creates a fitter with the default guess and solver settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fitter with the given settings.
    #[must_use]
    pub fn with_config(config: SvenssonConfig) -> Self {
        Self { config }
    }

    /// Sets the initial guess.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: SvenssonParameters) -> Self {
        self.config.initial_guess = guess;
        self
    }

    /// Sets the solver configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: LmConfig) -> Self {
        self.config.solver = solver;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SvenssonConfig {
        &self.config
    }

    /// Fits and evaluates on `grid`, starting from the configured guess.
    pub fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        self.fit_with_guess(observations, grid, self.config.initial_guess)
    }

    /// Fits and evaluates on `grid`, starting from `guess`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientData`] with fewer than six
    /// observations. Degenerate input, non-convergence and unusable fitted
    /// parameters are reported as [`FittedCurve::Empty`].
    pub fn fit_with_guess(
        &self,
        observations: &ObservationSet,
        grid: &CurveGrid,
        guess: SvenssonParameters,
    ) -> CurveResult<FittedCurve> {
        self.calibrate_with_guess(observations, guess)?.curve(grid)
    }

    /// Calibrates the model from the configured guess.
    pub fn calibrate(&self, observations: &ObservationSet) -> CurveResult<Calibration> {
        self.calibrate_with_guess(observations, self.config.initial_guess)
    }

    /// Calibrates the model from `guess`, returning the parameters rather
    /// than a sampled curve.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientData`] with fewer than six
    /// observations, and [`CurveError::InvalidParameters`] for a non-finite
    /// guess.
    pub fn calibrate_with_guess(
        &self,
        observations: &ObservationSet,
        guess: SvenssonParameters,
    ) -> CurveResult<Calibration> {
        let n = observations.len();
        if n < Self::MIN_OBSERVATIONS {
            return Err(CurveError::insufficient_data(Self::MIN_OBSERVATIONS, n));
        }
        if guess.to_array().iter().any(|p| !p.is_finite()) {
            return Err(CurveError::invalid_parameters(format!(
                "initial guess is not finite: {guess}"
            )));
        }

        let distinct = observations.distinct_maturities();
        if distinct < Self::MIN_OBSERVATIONS {
            debug!("svensson fit skipped: {distinct} distinct maturities in {n} observations");
            return Ok(Calibration::Skipped(SkipReason::DegenerateObservations {
                distinct,
            }));
        }

        let maturities = observations.maturities();
        let rates = observations.rates();
        let residuals = |p: &[f64]| -> Vec<f64> {
            maturities
                .iter()
                .zip(&rates)
                .map(|(&t, &y)| Svensson::evaluate(t, p) - y)
                .collect()
        };

        let solver = LevenbergMarquardt::new(self.config.solver);
        let result = solver.minimize(residuals, &guess.to_array())?;

        if !result.converged {
            debug!(
                "svensson fit did not converge: {:?} after {} iterations, residual {:.3e}",
                result.termination, result.iterations, result.residual_ss
            );
            return Ok(Calibration::Skipped(SkipReason::NotConverged {
                iterations: result.iterations,
                residual: result.residual_ss,
            }));
        }

        let params: [f64; 6] = match result.params.as_slice().try_into() {
            Ok(params) => params,
            Err(_) => {
                return Err(CurveError::malformed_input(format!(
                    "solver returned {} parameters",
                    result.params.len()
                )))
            }
        };
        let parameters = SvenssonParameters::from_array(params);
        if parameters.model().is_err() {
            debug!("svensson fit skipped: unusable parameters {parameters}");
            return Ok(Calibration::Skipped(SkipReason::NonFiniteParameters));
        }

        let fit = SvenssonFit {
            parameters,
            residual_ss: result.residual_ss,
            rmse: result.rmse(n),
            iterations: result.iterations,
        };
        debug!(
            "svensson fit: {n} observations, {} iterations ({}), rmse {:.3e}",
            fit.iterations,
            termination_label(result.termination),
            fit.rmse
        );
        Ok(Calibration::Fitted(fit))
    }
}

fn termination_label(termination: Termination) -> &'static str {
    match termination {
        Termination::ResidualTolerance => "residual tolerance",
        Termination::StepTolerance => "step tolerance",
        Termination::MaxIterations => "iteration budget",
        Termination::DampingExhausted => "damping exhausted",
        Termination::NonFinite => "non-finite residuals",
    }
}

impl CurveFitter for SvenssonCurveFitter {
    fn name(&self) -> &'static str {
        "svensson"
    }

    fn fit(&self, observations: &ObservationSet, grid: &CurveGrid) -> CurveResult<FittedCurve> {
        SvenssonCurveFitter::fit(self, observations, grid)
    }
}
