//! Integration test: fit a short DI history end to end.
//!
//! Market data: DI1 futures settlement rates (percent) for three sessions,
//! maturities in calendar days to expiry.
//!
//! | Days | 2024-12-02 | 2024-12-03 | 2024-12-04 |
//! |------|------------|------------|------------|
//! | 29   | 11.155     | 11.160     | 11.170     |
//! | 90   | 12.020     | 12.045     | 12.080     |
//! | 121  | 12.330     | 12.365     | 12.400     |
//! | 212  | 13.050     | 13.110     | 13.160     |
//! | 394  | 13.590     | 13.680     | 13.750     |
//! | 759  | 13.480     | 13.600     | 13.690     |
//! | 1125 | 13.330     | 13.450     | 13.540     |
//! | 1490 | 13.260     | 13.380     | 13.470     |
//! | 1855 | 13.210     | 13.330     | 13.420     |
//! | 2585 | 13.150     | 13.260     | 13.350     |
//! | 3316 | 13.100     | 13.200     | 13.290     |

use approx::assert_relative_eq;
use chrono::NaiveDate;
use dicurve_curves::prelude::*;
use proptest::prelude::*;

const MATURITIES: [f64; 11] = [
    29.0, 90.0, 121.0, 212.0, 394.0, 759.0, 1125.0, 1490.0, 1855.0, 2585.0, 3316.0,
];

const RATES: [[f64; 11]; 3] = [
    [
        11.155, 12.020, 12.330, 13.050, 13.590, 13.480, 13.330, 13.260, 13.210, 13.150, 13.100,
    ],
    [
        11.160, 12.045, 12.365, 13.110, 13.680, 13.600, 13.450, 13.380, 13.330, 13.260, 13.200,
    ],
    [
        11.170, 12.080, 12.400, 13.160, 13.750, 13.690, 13.540, 13.470, 13.420, 13.350, 13.290,
    ],
];

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
}

fn history() -> Vec<(NaiveDate, ObservationSet)> {
    RATES
        .iter()
        .zip(2..)
        .map(|(rates, day)| {
            (
                date(day),
                ObservationSet::from_columns(&MATURITIES, rates).unwrap(),
            )
        })
        .collect()
}

fn noiseless(params: SvenssonParameters, maturities: &[f64]) -> ObservationSet {
    ObservationSet::from_pairs(maturities.iter().map(|&t| (t, params.evaluate(t)))).unwrap()
}

// =============================================================================
// LINEAR
// =============================================================================

#[test]
fn test_linear_history_on_default_grid_truncated() {
    // The default linear grid starts at 5 days, before the first contract
    let runner = BatchRunner::new(
        Box::new(LinearCurveFitter::new().with_range_policy(RangePolicy::Truncate)),
        CurveGrid::linear_default(),
    );
    let outcome = runner.run(history()).unwrap();

    assert_eq!(outcome.report.fitted, 3);
    let table = outcome.series.table();
    assert_eq!(table.dates(), &[date(2), date(3), date(4)]);

    // Every column lies inside [29, 3000]
    assert!(table.maturities().iter().all(|&m| (29.0..=3000.0).contains(&m)));
    assert!(table.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_linear_strict_policy_aborts_run() {
    // Strict range checks fail the whole run at the first short-dated grid point
    let runner = BatchRunner::new(Box::new(LinearCurveFitter::new()), CurveGrid::linear_default());
    let err = runner.run(history()).unwrap_err();

    assert!(matches!(err, CurveError::OutOfRange { maturity, .. } if maturity == 5.0));
}

#[test]
fn test_linear_exactness() {
    let obs = ObservationSet::from_pairs([(100.0, 5.0), (200.0, 6.0), (300.0, 7.0)]).unwrap();
    let curve = LinearCurveFitter::new()
        .fit(&obs, &CurveGrid::new(vec![150.0, 250.0]).unwrap())
        .unwrap();
    assert_eq!(curve.values(), &[5.5, 6.5]);
}

// =============================================================================
// SVENSSON
// =============================================================================

#[test]
fn test_svensson_round_trip_twenty_maturities() {
    let truth = SvenssonParameters::from_array([0.08, -0.02, 0.01, 0.005, 1.5, 3.0]);
    let maturities = CurveGrid::linspace(30.0, 3600.0, 20).unwrap();
    let obs = noiseless(truth, maturities.points());

    let grid = CurveGrid::svensson_default();
    let curve = SvenssonCurveFitter::new().fit(&obs, &grid).unwrap();

    assert_eq!(curve.len(), grid.len());
    for (t, value) in curve.points() {
        assert_relative_eq!(value, truth.evaluate(t), epsilon = 1e-6);
    }
}

#[test]
fn test_svensson_market_history() {
    let runner = BatchRunner::new(Box::new(SvenssonCurveFitter::new()), CurveGrid::svensson_default());
    let outcome = runner.run(history()).unwrap();

    assert_eq!(outcome.report.fitted, 3);
    assert_eq!(outcome.series.skipped_count(), 0);

    let table = outcome.series.table();
    assert_eq!(table.shape(), (3, 100));
    assert!(table.values().iter().all(|v| v.is_finite()));

    for (_, obs) in history() {
        let calibration = SvenssonCurveFitter::new().calibrate(&obs).unwrap();
        let fit = calibration.fit().expect("market session should calibrate");
        assert!(fit.rmse < 0.5, "rmse {} too large", fit.rmse);
    }
}

#[test]
fn test_single_point_insufficient_for_both_fitters() {
    let obs = ObservationSet::from_pairs([(252.0, 13.0)]).unwrap();

    let linear = LinearCurveFitter::new().fit(&obs, &CurveGrid::linear_default());
    assert!(matches!(linear, Err(CurveError::InsufficientData { .. })));

    let svensson = SvenssonCurveFitter::new().fit(&obs, &CurveGrid::svensson_default());
    assert!(matches!(svensson, Err(CurveError::InsufficientData { .. })));
}

#[test]
fn test_identical_maturities_skip_the_date() {
    let degenerate = ObservationSet::from_pairs((0..6).map(|i| (365.0, 13.0 + f64::from(i) / 100.0))).unwrap();
    let runner = BatchRunner::new(
        Box::new(SvenssonCurveFitter::new()),
        CurveGrid::svensson_default(),
    );

    let outcome = runner.run(vec![(date(2), degenerate)]).unwrap();
    assert_eq!(outcome.report.skipped, 1);
    assert!(outcome.series.table().is_empty());
    assert_eq!(
        outcome.series.skipped()[0].cause,
        SkipCause::Empty(SkipReason::DegenerateObservations { distinct: 1 })
    );
}

// =============================================================================
// SERIES
// =============================================================================

#[test]
fn test_assembler_outer_join() {
    let d1 = date(2);
    let d2 = date(3);
    let c1 = FittedCurve::new(CurveGrid::new(vec![1.0, 2.0, 3.0]).unwrap(), vec![0.1, 0.2, 0.3]).unwrap();
    let c2 = FittedCurve::new(CurveGrid::new(vec![2.0, 3.0, 4.0]).unwrap(), vec![0.4, 0.5, 0.6]).unwrap();

    let mut assembler = CurveSeriesAssembler::new();
    assembler.add(d1, c1).unwrap();
    assembler.add(d2, c2).unwrap();
    let series = assembler.finalize();
    let table = series.table();

    assert_eq!(table.maturities(), &[1.0, 2.0, 3.0, 4.0]);
    assert!(table.get(d1, 4.0).unwrap().is_nan());
    assert!(table.get(d2, 1.0).unwrap().is_nan());
    assert_eq!(table.row(d1).unwrap().to_vec()[..3], [0.1, 0.2, 0.3]);
    assert_eq!(table.row(d2).unwrap().to_vec()[1..], [0.4, 0.5, 0.6]);
}

#[test]
fn test_config_driven_run() {
    let config = DicurveConfig::from_toml_str(
        r#"
        method = "linear"

        [grid]
        start = 29.0
        end = 3316.0
        points = 25

        [series]
        parallel = false
        "#,
    )
    .unwrap();

    let outcome = config.batch_runner().unwrap().run(history()).unwrap();
    assert_eq!(outcome.series.table().shape(), (3, 25));
    assert_eq!(outcome.series.table().get(date(2), 29.0), Some(11.155));
    assert_eq!(outcome.series.table().get(date(4), 3316.0), Some(13.290));
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn observation_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((1.0..4000.0f64, 5.0..20.0f64), 2..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_linear_curve_matches_grid(pairs in observation_strategy(), points in 1usize..60) {
        let obs = ObservationSet::from_pairs(pairs).unwrap();
        prop_assume!(obs.distinct_maturities() >= 2);
        let (min, max) = obs.maturity_range().unwrap();
        let grid = if points == 1 {
            CurveGrid::new(vec![min]).unwrap()
        } else {
            CurveGrid::linspace(min, max, points).unwrap()
        };

        let curve = LinearCurveFitter::new().fit(&obs, &grid).unwrap();
        prop_assert_eq!(curve.len(), grid.len());
        prop_assert_eq!(curve.grid(), Some(&grid));

        // Values stay within the observed rates
        let lo = obs.rates().into_iter().fold(f64::INFINITY, f64::min);
        let hi = obs.rates().into_iter().fold(f64::NEG_INFINITY, f64::max);
        for v in curve.values() {
            prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    #[test]
    fn prop_fits_are_deterministic(pairs in observation_strategy()) {
        let obs = ObservationSet::from_pairs(pairs).unwrap();
        let grid = CurveGrid::svensson_default();

        let svensson = SvenssonCurveFitter::new().with_solver(LmConfig::default().with_max_iterations(50));
        prop_assert_eq!(svensson.fit(&obs, &grid), svensson.fit(&obs, &grid));

        let linear = LinearCurveFitter::new().with_range_policy(RangePolicy::Skip);
        prop_assert_eq!(linear.fit(&obs, &grid), linear.fit(&obs, &grid));
    }

    #[test]
    fn prop_table_is_union_of_grids(sizes in prop::collection::vec(1usize..8, 1..6)) {
        let mut assembler = CurveSeriesAssembler::with_policy(DuplicateDatePolicy::Reject);
        let mut expected: Vec<f64> = Vec::new();

        for (i, size) in sizes.iter().enumerate() {
            let start = (i * 3) as f64 + 1.0;
            let points: Vec<f64> = (0..*size).map(|k| start + k as f64).collect();
            expected.extend(&points);
            let values = vec![0.1; *size];
            let curve = FittedCurve::new(CurveGrid::new(points).unwrap(), values).unwrap();
            assembler.add(date(1 + i as u32), curve).unwrap();
        }
        expected.sort_by(f64::total_cmp);
        expected.dedup();

        let table = assembler.finalize().into_table();
        prop_assert_eq!(table.shape(), (sizes.len(), expected.len()));
        prop_assert_eq!(table.maturities(), expected.as_slice());

        let filled = table.values().iter().filter(|v| !v.is_nan()).count();
        prop_assert_eq!(filled, sizes.iter().sum::<usize>());
    }
}
