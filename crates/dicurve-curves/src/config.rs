//! Run configuration.
//!
//! Every field has a default, so an empty TOML document reproduces the
//! standard daily run:
//!
//! ```toml
//! method = "svensson"          # or "linear"
//! day_basis = 365.0            # days per year when reporting in years
//!
//! [grid]                       # omitted bounds follow the method's default grid
//! start = 180.0
//! end = 3000.0
//! points = 100
//! # maturities = [21.0, 63.0, 126.0]   # explicit grid, overrides the above
//!
//! [linear]
//! range_policy = "strict"      # strict | truncate | skip
//! duplicate_policy = "average" # first | last | average
//!
//! [svensson.initial_guess]
//! beta0 = 0.1
//! beta1 = 0.1
//! beta2 = 0.1
//! beta3 = 0.1
//! lambda1 = 1.0
//! lambda2 = 1.0
//!
//! [svensson.solver]
//! max_iterations = 200
//! tolerance = 1e-12
//!
//! [series]
//! duplicate_dates = "replace"  # append | replace | reject
//! parallel = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::BatchRunner;
use crate::error::{CurveError, CurveResult};
use crate::fitters::{CurveFitter, FitMethod, LinearCurveFitter, SvenssonConfig, SvenssonCurveFitter};
use crate::grid::CurveGrid;
use crate::series::DuplicateDatePolicy;

/// Output grid settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// First maturity in days.
    pub start: Option<f64>,
    /// Last maturity in days.
    pub end: Option<f64>,
    /// Number of evenly spaced points.
    pub points: Option<usize>,
    /// Explicit maturities; when set, the bounds above are ignored.
    pub maturities: Option<Vec<f64>>,
}

impl GridConfig {
    /// Builds the grid, filling unset fields from `method`'s default grid.
    pub fn build(&self, method: FitMethod) -> CurveResult<CurveGrid> {
        if let Some(maturities) = &self.maturities {
            return CurveGrid::new(maturities.clone());
        }
        let default = method.default_grid();
        CurveGrid::linspace(
            self.start.unwrap_or(default.first()),
            self.end.unwrap_or(default.last()),
            self.points.unwrap_or(default.len()),
        )
    }
}

/// Series assembly and batch settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Handling of dates seen twice.
    pub duplicate_dates: DuplicateDatePolicy,
    /// Fit dates in parallel.
    pub parallel: bool,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            duplicate_dates: DuplicateDatePolicy::default(),
            parallel: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DicurveConfig {
    /// Fitting method.
    pub method: FitMethod,
    /// Days per year for maturities reported in years.
    pub day_basis: f64,
    /// Output grid.
    pub grid: GridConfig,
    /// Linear fitter settings.
    pub linear: LinearCurveFitter,
    /// Svensson fitter settings.
    pub svensson: SvenssonConfig,
    /// Series settings.
    pub series: SeriesConfig,
}

impl Default for DicurveConfig {
    fn default() -> Self {
        Self {
            method: FitMethod::default(),
            day_basis: 365.0,
            grid: GridConfig::default(),
            linear: LinearCurveFitter::default(),
            svensson: SvenssonConfig::default(),
            series: SeriesConfig::default(),
        }
    }
}

impl DicurveConfig {
    /// Loads and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> CurveResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CurveError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> CurveResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| CurveError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> CurveResult<String> {
        toml::to_string_pretty(self).map_err(|e| CurveError::config(e.to_string()))
    }

    /// Checks settings the type system does not.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::Config`] listing every problem found.
    pub fn validate(&self) -> CurveResult<()> {
        let mut problems = Vec::new();

        if !(self.day_basis.is_finite() && self.day_basis > 0.0) {
            problems.push(format!("day_basis must be positive, got {}", self.day_basis));
        }
        if let Err(e) = self.grid.build(self.method) {
            problems.push(format!("grid: {e}"));
        }

        let solver = &self.svensson.solver;
        if solver.max_iterations == 0 {
            problems.push("svensson.solver.max_iterations must be at least 1".to_string());
        }
        if !(solver.tolerance >= 0.0 && solver.param_tolerance >= 0.0) {
            problems.push("svensson.solver tolerances must be non-negative".to_string());
        }
        if !(solver.damping_up > 1.0 && solver.damping_down > 0.0 && solver.damping_down < 1.0) {
            problems.push(
                "svensson.solver damping factors need damping_up > 1 and 0 < damping_down < 1"
                    .to_string(),
            );
        }
        if !(solver.jacobian_step > 0.0) {
            problems.push("svensson.solver.jacobian_step must be positive".to_string());
        }
        if let Err(e) = self.svensson.initial_guess.model() {
            problems.push(format!("svensson.initial_guess: {e}"));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CurveError::config(problems.join("; ")))
        }
    }

    /// The output grid.
    pub fn grid(&self) -> CurveResult<CurveGrid> {
        self.grid.build(self.method)
    }

    /// The configured fitter.
    pub fn fitter(&self) -> Box<dyn CurveFitter> {
        match self.method {
            FitMethod::Linear => Box::new(self.linear),
            FitMethod::Svensson => Box::new(SvenssonCurveFitter::with_config(self.svensson)),
        }
    }

    /// A batch runner for the configured method, grid and series settings.
    pub fn batch_runner(&self) -> CurveResult<BatchRunner> {
        Ok(BatchRunner::new(self.fitter(), self.grid()?)
            .with_date_policy(self.series.duplicate_dates)
            .with_parallel(self.series.parallel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitters::{RangePolicy, SvenssonParameters};
    use crate::observation::DuplicateMaturityPolicy;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = DicurveConfig::from_toml_str("").unwrap();
        assert_eq!(config, DicurveConfig::default());
        assert_eq!(config.grid().unwrap(), CurveGrid::svensson_default());
        assert_eq!(config.fitter().name(), "svensson");
    }

    #[test]
    fn test_linear_defaults_to_linear_grid() {
        let config = DicurveConfig::from_toml_str(r#"method = "linear""#).unwrap();
        assert_eq!(config.grid().unwrap(), CurveGrid::linear_default());
        assert_eq!(config.fitter().name(), "linear");
    }

    #[test]
    fn test_full_document() {
        let config = DicurveConfig::from_toml_str(
            r#"
            method = "linear"
            day_basis = 252.0

            [grid]
            start = 21.0
            end = 2520.0
            points = 50

            [linear]
            range_policy = "truncate"
            duplicate_policy = "last"

            [svensson.initial_guess]
            beta0 = 0.12
            beta1 = -0.02
            beta2 = 0.01
            beta3 = 0.0
            lambda1 = 0.004
            lambda2 = 0.001

            [svensson.solver]
            max_iterations = 500

            [series]
            duplicate_dates = "reject"
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.day_basis, 252.0);
        let grid = config.grid().unwrap();
        assert_eq!((grid.first(), grid.last(), grid.len()), (21.0, 2520.0, 50));
        assert_eq!(config.linear.range_policy, RangePolicy::Truncate);
        assert_eq!(config.linear.duplicate_policy, DuplicateMaturityPolicy::Last);
        assert_eq!(
            config.svensson.initial_guess,
            SvenssonParameters::from_array([0.12, -0.02, 0.01, 0.0, 0.004, 0.001])
        );
        assert_eq!(config.svensson.solver.max_iterations, 500);
        assert_eq!(config.svensson.solver.tolerance, 1e-12);
        assert_eq!(config.series.duplicate_dates, DuplicateDatePolicy::Reject);
        assert!(!config.series.parallel);
    }

    #[test]
    fn test_explicit_maturities() {
        let config =
            DicurveConfig::from_toml_str("[grid]\nmaturities = [21.0, 42.0, 63.0]").unwrap();
        assert_eq!(config.grid().unwrap().points(), &[21.0, 42.0, 63.0]);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = DicurveConfig::from_toml_str("day_basis = 0.0").unwrap_err();
        assert!(matches!(err, CurveError::Config { .. }));

        let err = DicurveConfig::from_toml_str("[grid]\nstart = 3000.0\nend = 5.0").unwrap_err();
        assert!(err.to_string().contains("grid"));

        let err = DicurveConfig::from_toml_str("[grid]\nstart = 0.0\nend = 3000.0\npoints = 10")
            .unwrap_err();
        assert!(err.to_string().contains("grid"));
        assert!(err.to_string().contains("positive"));

        let err = DicurveConfig::from_toml_str("[grid]\nmaturities = [-21.0, 252.0]").unwrap_err();
        assert!(err.to_string().contains("positive"));

        let err = DicurveConfig::from_toml_str(
            "[svensson.initial_guess]\nbeta0 = 0.1\nbeta1 = 0.1\nbeta2 = 0.1\nbeta3 = 0.1\nlambda1 = 0.0\nlambda2 = 1.0",
        )
        .unwrap_err();
        assert!(err.to_string().contains("initial_guess"));

        assert!(DicurveConfig::from_toml_str(r#"method = "cubic""#).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DicurveConfig::default();
        config.method = FitMethod::Linear;
        config.series.duplicate_dates = DuplicateDatePolicy::Append;

        let text = config.to_toml_string().unwrap();
        assert_eq!(DicurveConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = DicurveConfig::from_file("/nonexistent/dicurve.toml").unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
