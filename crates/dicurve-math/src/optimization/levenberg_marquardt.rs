//! Levenberg-Marquardt nonlinear least squares.
//!
//! Minimises `Σ rᵢ(p)²` for a residual function `r`. Each iteration solves
//!
//! ```text
//! (JᵀJ + μ·diag(JᵀJ)) δ = -Jᵀr
//! ```
//!
//! with a forward-difference Jacobian `J`, accepting the step when it lowers
//! the sum of squares and raising the damping `μ` otherwise.

use log::trace;
use nalgebra::{DMatrix, DVector};

use super::{LmConfig, LmResult, Termination};
use crate::error::{MathError, MathResult};
use crate::linear_algebra::solve_damped_normal_equations;

/// Floor for the Marquardt scaling of a parameter column.
const MIN_SCALE: f64 = 1e-30;

/// Levenberg-Marquardt solver.
///
/// # Example
///
/// ```rust
/// use dicurve_math::optimization::{LevenbergMarquardt, LmConfig};
///
/// // Fit y = a·e^(-b·x)
/// let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let ys: Vec<f64> = xs.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
///
/// let solver = LevenbergMarquardt::new(LmConfig::default());
/// let result = solver
///     .minimize(
///         |p: &[f64]| xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y).collect(),
///         &[1.0, 1.0],
///     )
///     .unwrap();
///
/// assert!(result.converged);
/// assert!((result.params[0] - 2.0).abs() < 1e-8);
/// assert!((result.params[1] - 0.5).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Creates a solver with the given configuration.
    #[must_use]
    pub fn new(config: LmConfig) -> Self {
        Self { config }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Minimises the sum of squared residuals starting from `initial`.
    ///
    /// Non-convergence is reported through [`LmResult::converged`] and
    /// [`LmResult::termination`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InsufficientData`] when there are fewer residuals
    /// than parameters, and [`MathError::InvalidInput`] for an empty parameter
    /// vector or a residual function whose output length changes.
    pub fn minimize<F>(&self, residuals: F, initial: &[f64]) -> MathResult<LmResult>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n = initial.len();
        if n == 0 {
            return Err(MathError::invalid_input("no parameters to fit"));
        }

        let mut params = initial.to_vec();
        let mut r = residuals(&params);
        let m = r.len();
        if m < n {
            return Err(MathError::insufficient_data(n, m));
        }

        let mut cost = sum_of_squares(&r);
        if !cost.is_finite() {
            return Ok(self.finish(params, cost, 0, Termination::NonFinite));
        }
        if cost == 0.0 {
            return Ok(self.finish(params, cost, 0, Termination::ResidualTolerance));
        }

        let cfg = &self.config;
        let mut damping = cfg.initial_damping;

        for iteration in 1..=cfg.max_iterations {
            let jacobian = self.jacobian(&residuals, &params, &r)?;
            let r_vec = DVector::from_column_slice(&r);
            let jtj = jacobian.transpose() * &jacobian;
            let jtr = jacobian.transpose() * &r_vec;

            // Inner loop: raise the damping until a step lowers the cost
            loop {
                let step = match solve_damped_normal_equations(&jtj, &jtr, damping, MIN_SCALE) {
                    Ok(delta) => -delta,
                    Err(MathError::SingularMatrix) => {
                        damping *= cfg.damping_up;
                        if damping > cfg.max_damping {
                            return Ok(self.finish(
                                params,
                                cost,
                                iteration,
                                Termination::DampingExhausted,
                            ));
                        }
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let param_norm = norm(&params);
                if step.norm() <= cfg.param_tolerance * (param_norm + cfg.param_tolerance) {
                    return Ok(self.finish(params, cost, iteration, Termination::StepTolerance));
                }

                let trial: Vec<f64> = params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
                let trial_r = residuals(&trial);
                if trial_r.len() != m {
                    return Err(MathError::invalid_input(format!(
                        "residual count changed from {m} to {}",
                        trial_r.len()
                    )));
                }
                let trial_cost = sum_of_squares(&trial_r);

                if trial_cost.is_finite() && trial_cost < cost {
                    let reduction = cost - trial_cost;
                    trace!(
                        "LM iteration {iteration}: cost {cost:.6e} -> {trial_cost:.6e}, damping {damping:.1e}"
                    );

                    params = trial;
                    r = trial_r;
                    cost = trial_cost;
                    damping = (damping * cfg.damping_down).max(cfg.min_damping);

                    if cost == 0.0 || reduction <= cfg.tolerance * (cost + reduction) {
                        return Ok(self.finish(
                            params,
                            cost,
                            iteration,
                            Termination::ResidualTolerance,
                        ));
                    }
                    break;
                }

                damping *= cfg.damping_up;
                if damping > cfg.max_damping {
                    return Ok(self.finish(params, cost, iteration, Termination::DampingExhausted));
                }
            }
        }

        Ok(self.finish(params, cost, cfg.max_iterations, Termination::MaxIterations))
    }

    /// Forward-difference Jacobian of the residuals, m × n.
    fn jacobian<F>(&self, residuals: &F, params: &[f64], r: &[f64]) -> MathResult<DMatrix<f64>>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let m = r.len();
        let n = params.len();
        let mut jacobian = DMatrix::zeros(m, n);
        let mut bumped = params.to_vec();

        for j in 0..n {
            let h = self.config.jacobian_step * params[j].abs().max(1.0);
            bumped[j] = params[j] + h;
            let r_up = residuals(&bumped);
            bumped[j] = params[j];

            if r_up.len() != m {
                return Err(MathError::invalid_input(format!(
                    "residual count changed from {m} to {}",
                    r_up.len()
                )));
            }

            // Actual bump after rounding
            let h = (params[j] + h) - params[j];
            for i in 0..m {
                let d = (r_up[i] - r[i]) / h;
                jacobian[(i, j)] = if d.is_finite() { d } else { 0.0 };
            }
        }

        Ok(jacobian)
    }

    fn finish(
        &self,
        params: Vec<f64>,
        residual_ss: f64,
        iterations: usize,
        termination: Termination,
    ) -> LmResult {
        LmResult {
            params,
            residual_ss,
            iterations,
            converged: termination.is_converged(),
            termination,
        }
    }
}

/// Convenience wrapper around [`LevenbergMarquardt::minimize`].
pub fn levenberg_marquardt<F>(
    residuals: F,
    initial: &[f64],
    config: &LmConfig,
) -> MathResult<LmResult>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    LevenbergMarquardt::new(*config).minimize(residuals, initial)
}

fn sum_of_squares(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum()
}

fn norm(v: &[f64]) -> f64 {
    sum_of_squares(v).sqrt()
}
