//! Fitting many dates in one run.

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::CurveResult;
use crate::fitted::FittedCurve;
use crate::fitters::CurveFitter;
use crate::grid::CurveGrid;
use crate::observation::ObservationSet;
use crate::series::{AddOutcome, CurveSeries, CurveSeriesAssembler, DuplicateDatePolicy};

/// Counts from a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Dates submitted.
    pub requested: usize,
    /// Dates that produced a row (replacements included).
    pub fitted: usize,
    /// Dates whose fitter returned an empty curve.
    pub skipped: usize,
    /// Dates whose fit failed with a data-dependent error.
    pub errored: usize,
}

impl BatchReport {
    /// Dates without a row for any reason.
    pub fn missing(&self) -> usize {
        self.skipped + self.errored
    }
}

/// The series and counts from [`BatchRunner::run`].
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// The assembled series.
    pub series: CurveSeries,
    /// Run counts.
    pub report: BatchReport,
}

/// Fits every date with one fitter and grid and assembles the results.
///
/// Fits run in parallel when the `parallel` feature is enabled and the
/// batch is large enough; results are always merged in input order, so the
/// table is identical either way.
pub struct BatchRunner {
    fitter: Box<dyn CurveFitter>,
    grid: CurveGrid,
    date_policy: DuplicateDatePolicy,
    parallel: bool,
    parallel_threshold: usize,
}

impl BatchRunner {
    /// Minimum batch size for parallel fitting.
    pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

    /// Creates a runner.
    pub fn new(fitter: Box<dyn CurveFitter>, grid: CurveGrid) -> Self {
        Self {
            fitter,
            grid,
            date_policy: DuplicateDatePolicy::default(),
            parallel: true,
            parallel_threshold: Self::DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Sets the duplicate-date policy.
    #[must_use]
    pub fn with_date_policy(mut self, date_policy: DuplicateDatePolicy) -> Self {
        self.date_policy = date_policy;
        self
    }

    /// Enables or disables parallel fitting.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the minimum batch size for parallel fitting.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// The fitter.
    pub fn fitter(&self) -> &dyn CurveFitter {
        self.fitter.as_ref()
    }

    /// The output grid.
    pub fn grid(&self) -> &CurveGrid {
        &self.grid
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }

    /// Fits every `(date, observations)` pair.
    ///
    /// Empty curves and data-dependent errors
    /// ([`CurveError::is_data_dependent`](crate::CurveError::is_data_dependent))
    /// skip the date. Any other error, including a strict-policy
    /// [`CurveError::OutOfRange`](crate::CurveError::OutOfRange), aborts the run.
    ///
    /// # Errors
    ///
    /// Returns the first non-data-dependent fit error in input order, or
    /// [`CurveError::DuplicateDate`](crate::CurveError::DuplicateDate) under
    /// the reject policy.
    pub fn run(
        &self,
        inputs: impl IntoIterator<Item = (NaiveDate, ObservationSet)>,
    ) -> CurveResult<BatchOutcome> {
        let inputs: Vec<(NaiveDate, ObservationSet)> = inputs.into_iter().collect();
        let results = self.fit_all(&inputs);

        let mut assembler = CurveSeriesAssembler::with_policy(self.date_policy);
        let mut report = BatchReport {
            requested: inputs.len(),
            ..BatchReport::default()
        };

        for ((date, _), result) in inputs.iter().zip(results) {
            match result {
                Ok(curve) => match assembler.add(*date, curve)? {
                    AddOutcome::Added | AddOutcome::Replaced => report.fitted += 1,
                    AddOutcome::Skipped => report.skipped += 1,
                },
                Err(error) if error.is_data_dependent() => {
                    assembler.record_error(*date, error);
                    report.errored += 1;
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            "{} fit of {} dates: {} fitted, {} skipped, {} errored",
            self.fitter.name(),
            report.requested,
            report.fitted,
            report.skipped,
            report.errored
        );

        Ok(BatchOutcome {
            series: assembler.finalize(),
            report,
        })
    }

    fn fit_all(&self, inputs: &[(NaiveDate, ObservationSet)]) -> Vec<CurveResult<FittedCurve>> {
        let fit = |(_, observations): &(NaiveDate, ObservationSet)| {
            self.fitter.fit(observations, &self.grid)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if self.should_parallelize(inputs.len()) {
                return inputs.par_iter().map(fit).collect();
            }
        }

        inputs.iter().map(fit).collect()
    }
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("fitter", &self.fitter.name())
            .field("grid_points", &self.grid.len())
            .field("date_policy", &self.date_policy)
            .field("parallel", &self.parallel)
            .field("parallel_threshold", &self.parallel_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CurveError;
    use crate::fitters::{LinearCurveFitter, RangePolicy};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
    }

    fn linear_day(offset: f64) -> ObservationSet {
        ObservationSet::from_pairs([(100.0, 5.0 + offset), (300.0, 7.0 + offset)]).unwrap()
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(
            Box::new(LinearCurveFitter::new()),
            CurveGrid::new(vec![100.0, 200.0, 300.0]).unwrap(),
        )
    }

    #[test]
    fn test_run_counts() {
        let inputs = vec![
            (date(2), linear_day(0.0)),
            (date(3), ObservationSet::from_pairs([(100.0, 5.0)]).unwrap()),
            (date(4), linear_day(1.0)),
        ];

        let outcome = runner().run(inputs).unwrap();
        assert_eq!(
            outcome.report,
            BatchReport {
                requested: 3,
                fitted: 2,
                skipped: 0,
                errored: 1
            }
        );
        assert_eq!(outcome.report.missing(), 1);
        assert_eq!(outcome.series.skipped_count(), 1);
        assert_eq!(outcome.series.table().dates(), &[date(2), date(4)]);
        assert_eq!(outcome.series.table().get(date(4), 200.0), Some(7.0));
    }

    #[test]
    fn test_strict_out_of_range_aborts_run() {
        let inputs = vec![
            (date(2), linear_day(0.0)),
            (date(3), ObservationSet::from_pairs([(150.0, 5.0), (250.0, 6.0)]).unwrap()),
        ];

        let err = runner().run(inputs).unwrap_err();
        assert!(matches!(err, CurveError::OutOfRange { maturity, .. } if maturity == 100.0));
    }

    #[test]
    fn test_empty_curves_counted_as_skipped() {
        let runner = BatchRunner::new(
            Box::new(LinearCurveFitter::new().with_range_policy(RangePolicy::Skip)),
            CurveGrid::new(vec![50.0, 200.0]).unwrap(),
        );

        let outcome = runner.run(vec![(date(2), linear_day(0.0))]).unwrap();
        assert_eq!(outcome.report.skipped, 1);
        assert!(outcome.series.table().is_empty());
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let runner = runner().with_date_policy(DuplicateDatePolicy::Reject);
        let err = runner
            .run(vec![(date(2), linear_day(0.0)), (date(2), linear_day(1.0))])
            .unwrap_err();
        assert_eq!(err, CurveError::DuplicateDate { date: date(2) });
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inputs: Vec<_> = (1..=20)
            .map(|d| (date(d), linear_day(f64::from(d) / 10.0)))
            .collect();

        let sequential = runner().with_parallel(false).run(inputs.clone()).unwrap();
        let parallel = runner()
            .with_parallel(true)
            .with_parallel_threshold(1)
            .run(inputs)
            .unwrap();

        assert_eq!(sequential.report, parallel.report);
        assert_eq!(sequential.series.table(), parallel.series.table());
    }
}
