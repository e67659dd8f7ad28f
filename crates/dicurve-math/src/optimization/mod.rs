//! Optimization algorithms.
//!
//! This module provides the nonlinear least-squares solver used to fit
//! parametric curves to observed rates.

mod levenberg_marquardt;

pub use levenberg_marquardt::{levenberg_marquardt, LevenbergMarquardt};

use serde::{Deserialize, Serialize};

/// Configuration for the Levenberg-Marquardt solver.
///
/// `max_iterations` bounds the worst-case cost of a single fit; each
/// iteration costs one Jacobian (n + 1 residual evaluations) plus one
/// evaluation per trial step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Relative reduction of the residual sum of squares below which an
    /// accepted step counts as converged.
    pub tolerance: f64,
    /// Relative step size below which the parameters count as converged.
    pub param_tolerance: f64,
    /// Initial damping factor.
    pub initial_damping: f64,
    /// Damping multiplier applied when a step is rejected.
    pub damping_up: f64,
    /// Damping multiplier applied when a step is accepted.
    pub damping_down: f64,
    /// Lower bound on the damping factor.
    pub min_damping: f64,
    /// Upper bound on the damping factor; exceeding it stops the solver.
    pub max_damping: f64,
    /// Relative finite-difference step for the Jacobian.
    pub jacobian_step: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            param_tolerance: 1e-12,
            initial_damping: 1e-3,
            damping_up: 10.0,
            damping_down: 0.1,
            min_damping: 1e-10,
            max_damping: 1e10,
            jacobian_step: 1.5e-8,
        }
    }
}

impl LmConfig {
    /// Creates a new configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the relative residual tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the relative parameter tolerance.
    #[must_use]
    pub fn with_param_tolerance(mut self, param_tolerance: f64) -> Self {
        self.param_tolerance = param_tolerance;
        self
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The residual sum of squares stopped decreasing (or reached zero).
    ResidualTolerance,
    /// The parameter step became negligible.
    StepTolerance,
    /// The iteration budget ran out.
    MaxIterations,
    /// No trial step reduced the residuals before the damping hit its cap.
    DampingExhausted,
    /// The residuals at the initial guess were NaN or infinite.
    NonFinite,
}

impl Termination {
    /// Returns true if this termination means the fit converged.
    pub fn is_converged(self) -> bool {
        matches!(self, Self::ResidualTolerance | Self::StepTolerance)
    }
}

/// Result of a least-squares run.
#[derive(Debug, Clone, PartialEq)]
pub struct LmResult {
    /// Final parameters.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Number of outer iterations used.
    pub iterations: usize,
    /// Whether the solver converged.
    pub converged: bool,
    /// Why the solver stopped.
    pub termination: Termination,
}

impl LmResult {
    /// Root mean square residual over `n_observations`.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}
