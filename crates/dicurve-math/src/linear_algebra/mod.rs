//! Linear algebra utilities.
//!
//! Small dense solves used by the least-squares fitter. Everything is built
//! on `nalgebra` dynamic matrices; the systems are 6×6 at most in practice.

use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};

/// Solves a linear system Ax = b using LU decomposition with partial pivoting.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if n != b.len() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: n,
            rows2: b.len(),
            cols2: 1,
        });
    }

    let x = a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(MathError::SingularMatrix)
    }
}

/// Solves the Levenberg-Marquardt damped normal equations.
///
/// ```text
/// (JᵀJ + μ·D) δ = Jᵀr
/// ```
///
/// where `D` is `diag(JᵀJ)` (Marquardt scaling) floored at `min_scale`, so a
/// parameter the residuals barely depend on still gets a usable damping term.
/// Cholesky is tried first since the damped matrix is symmetric positive
/// definite in exact arithmetic; LU is the fallback when rounding breaks that.
pub fn solve_damped_normal_equations(
    jtj: &DMatrix<f64>,
    jtr: &DVector<f64>,
    damping: f64,
    min_scale: f64,
) -> MathResult<DVector<f64>> {
    let n = jtj.nrows();
    if n != jtj.ncols() || n != jtr.len() {
        return Err(MathError::DimensionMismatch {
            rows1: jtj.nrows(),
            cols1: jtj.ncols(),
            rows2: jtr.len(),
            cols2: 1,
        });
    }

    let mut damped = jtj.clone();
    for i in 0..n {
        damped[(i, i)] += damping * jtj[(i, i)].max(min_scale);
    }

    if let Some(cholesky) = damped.clone().cholesky() {
        let delta = cholesky.solve(jtr);
        if delta.iter().all(|v| v.is_finite()) {
            return Ok(delta);
        }
    }

    solve_linear_system(&damped, jtr)
}
