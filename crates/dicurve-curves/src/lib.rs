//! # dicurve Curves
//!
//! Daily DI futures yield-curve fitting for the dicurve toolkit.
//!
//! This crate provides:
//!
//! - **Observations**: validated `(maturity in days, rate)` sets, one per date
//! - **Grids**: the fixed maturities every curve is resampled on
//! - **Fitters**: linear interpolation and Svensson least squares behind the
//!   [`CurveFitter`] trait
//! - **Series**: outer-join assembly of many dates into a date × maturity
//!   [`CurveTable`]
//! - **Batch**: parallel fitting of a whole history with skip accounting
//! - **Configuration**: TOML-backed [`DicurveConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use dicurve_curves::prelude::*;
//!
//! let d1 = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
//! let d2 = NaiveDate::from_ymd_opt(2024, 12, 3).unwrap();
//!
//! let inputs = vec![
//!     (d1, ObservationSet::from_pairs([(21.0, 10.9), (252.0, 12.4), (756.0, 13.1)]).unwrap()),
//!     (d2, ObservationSet::from_pairs([(20.0, 10.8), (251.0, 12.5), (755.0, 13.3)]).unwrap()),
//! ];
//!
//! let grid = CurveGrid::linspace(21.0, 720.0, 10).unwrap();
//! let runner = BatchRunner::new(Box::new(LinearCurveFitter::new()), grid);
//! let outcome = runner.run(inputs).unwrap();
//!
//! assert_eq!(outcome.series.table().shape(), (2, 10));
//! assert_eq!(outcome.report.fitted, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod batch;
pub mod config;
pub mod error;
pub mod fitted;
pub mod fitters;
pub mod grid;
pub mod observation;
pub mod series;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchOutcome, BatchReport, BatchRunner};
    pub use crate::config::{DicurveConfig, GridConfig, SeriesConfig};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::fitted::{FittedCurve, SkipReason};
    pub use crate::fitters::{
        Calibration, CurveFitter, FitMethod, LinearCurveFitter, RangePolicy, SvenssonConfig,
        SvenssonCurveFitter, SvenssonFit, SvenssonParameters,
    };
    pub use crate::grid::CurveGrid;
    pub use crate::observation::{DuplicateMaturityPolicy, Observation, ObservationSet};
    pub use crate::series::{
        AddOutcome, CurveSeries, CurveSeriesAssembler, CurveTable, DuplicateDatePolicy,
        SkipCause, SkippedDate,
    };
    pub use dicurve_math::optimization::LmConfig;
}

pub use batch::{BatchOutcome, BatchReport, BatchRunner};
pub use config::DicurveConfig;
pub use error::{CurveError, CurveResult};
pub use fitted::{FittedCurve, SkipReason};
pub use fitters::{CurveFitter, FitMethod, LinearCurveFitter, SvenssonCurveFitter};
pub use grid::CurveGrid;
pub use observation::{Observation, ObservationSet};
pub use series::{CurveSeries, CurveSeriesAssembler, CurveTable};
