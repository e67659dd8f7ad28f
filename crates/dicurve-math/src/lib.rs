//! # dicurve Math
//!
//! Numerical kernels behind the dicurve curve fitters.
//!
//! This crate provides:
//!
//! - **Interpolation**: piecewise-linear interpolation and the Svensson
//!   parametric term-structure model
//! - **Optimization**: Levenberg-Marquardt nonlinear least squares
//! - **Linear Algebra**: damped normal-equation solves
//!
//! Nothing here knows about dates, grids or observation sets; those live in
//! `dicurve-curves`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::unreadable_literal)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod optimization;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{Interpolator, LinearInterpolator, Svensson};
    pub use crate::optimization::{
        levenberg_marquardt, LevenbergMarquardt, LmConfig, LmResult, Termination,
    };
}

pub use error::{MathError, MathResult};
