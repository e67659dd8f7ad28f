//! Assembly of per-date curves into a date × maturity table.
//!
//! Curves from different dates may sit on different grids (a truncated
//! linear fit, say). The table takes the union of every grid as its
//! columns and fills the cells a date has no value for with `NaN`.

use std::fmt;

use chrono::NaiveDate;
use log::warn;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::fitted::{FittedCurve, SkipReason};

/// What happens when a date is added a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDatePolicy {
    /// Keep both; the table gets two rows with the same date.
    Append,
    /// The later curve wins; the row keeps its original position.
    #[default]
    Replace,
    /// Fail with [`CurveError::DuplicateDate`].
    Reject,
}

/// Result of [`CurveSeriesAssembler::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was added.
    Added,
    /// An existing row for the date was overwritten.
    Replaced,
    /// The curve was empty and the date was skipped.
    Skipped,
}

/// Why a date is missing from the table.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipCause {
    /// The fitter returned an empty curve.
    Empty(SkipReason),
    /// The fit failed with a data-dependent error.
    Error(CurveError),
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(reason) => fmt::Display::fmt(reason, f),
            Self::Error(error) => fmt::Display::fmt(error, f),
        }
    }
}

/// A date that produced no row.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDate {
    /// The date.
    pub date: NaiveDate,
    /// Why it was skipped.
    pub cause: SkipCause,
}

/// Collects one curve per date.
#[derive(Debug, Clone, Default)]
pub struct CurveSeriesAssembler {
    policy: DuplicateDatePolicy,
    curves: Vec<(NaiveDate, FittedCurve)>,
    skipped: Vec<SkippedDate>,
}

impl CurveSeriesAssembler {
    /// Creates an assembler with the default duplicate-date policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler with the given duplicate-date policy.
    #[must_use]
    pub fn with_policy(policy: DuplicateDatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The duplicate-date policy.
    pub fn policy(&self) -> DuplicateDatePolicy {
        self.policy
    }

    /// Adds the curve for `date`.
    ///
    /// An empty curve records the date as skipped and leaves any row already
    /// present for it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::DuplicateDate`] when the date already has a row
    /// and the policy is [`DuplicateDatePolicy::Reject`].
    pub fn add(&mut self, date: NaiveDate, curve: FittedCurve) -> CurveResult<AddOutcome> {
        if let FittedCurve::Empty(reason) = curve {
            warn!("{date}: skipped, {reason}");
            self.skipped.push(SkippedDate {
                date,
                cause: SkipCause::Empty(reason),
            });
            return Ok(AddOutcome::Skipped);
        }

        let existing = self.curves.iter().position(|(d, _)| *d == date);
        match (existing, self.policy) {
            (Some(_), DuplicateDatePolicy::Reject) => Err(CurveError::DuplicateDate { date }),
            (Some(i), DuplicateDatePolicy::Replace) => {
                self.curves[i].1 = curve;
                Ok(AddOutcome::Replaced)
            }
            (None, _) | (Some(_), DuplicateDatePolicy::Append) => {
                self.curves.push((date, curve));
                Ok(AddOutcome::Added)
            }
        }
    }

    /// Records a date whose fit failed so that it shows up in the skip count.
    pub fn record_error(&mut self, date: NaiveDate, error: CurveError) {
        warn!("{date}: skipped, {error}");
        self.skipped.push(SkippedDate {
            date,
            cause: SkipCause::Error(error),
        });
    }

    /// Skipped dates in the order they were seen.
    pub fn skipped(&self) -> &[SkippedDate] {
        &self.skipped
    }

    /// Number of rows collected so far.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns true if no row has been collected.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Builds the series.
    pub fn finalize(self) -> CurveSeries {
        let table = CurveTable::from_curves(&self.curves);
        CurveSeries {
            curves: self.curves,
            skipped: self.skipped,
            table,
        }
    }
}

/// The assembled, read-only result of a run.
#[derive(Debug, Clone)]
pub struct CurveSeries {
    curves: Vec<(NaiveDate, FittedCurve)>,
    skipped: Vec<SkippedDate>,
    table: CurveTable,
}

impl CurveSeries {
    /// The date × maturity table.
    pub fn table(&self) -> &CurveTable {
        &self.table
    }

    /// The fitted curves in row order.
    pub fn curves(&self) -> &[(NaiveDate, FittedCurve)] {
        &self.curves
    }

    /// Dates that produced no row.
    pub fn skipped(&self) -> &[SkippedDate] {
        &self.skipped
    }

    /// Number of skipped dates.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Consumes the series, returning its table.
    pub fn into_table(self) -> CurveTable {
        self.table
    }
}

/// Rectangular date × maturity table.
///
/// Rows follow insertion order, columns are the ascending union of every
/// grid point, and a cell with no value is `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveTable {
    dates: Vec<NaiveDate>,
    maturities: Vec<f64>,
    values: Array2<f64>,
}

impl CurveTable {
    /// Outer-joins curves on their grid maturities. Empty curves contribute
    /// no row.
    pub fn from_curves(curves: &[(NaiveDate, FittedCurve)]) -> Self {
        let rows: Vec<&(NaiveDate, FittedCurve)> =
            curves.iter().filter(|(_, c)| !c.is_empty()).collect();

        let mut maturities: Vec<f64> = rows
            .iter()
            .flat_map(|(_, c)| c.grid().map_or(&[][..], |g| g.points()).iter().copied())
            .collect();
        maturities.sort_by(f64::total_cmp);
        maturities.dedup();

        let mut values = Array2::from_elem((rows.len(), maturities.len()), f64::NAN);
        for (i, (_, curve)) in rows.iter().enumerate() {
            for (maturity, value) in curve.points() {
                if let Ok(j) = maturities.binary_search_by(|m| m.total_cmp(&maturity)) {
                    values[[i, j]] = value;
                }
            }
        }

        Self {
            dates: rows.iter().map(|(d, _)| *d).collect(),
            maturities,
            values,
        }
    }

    /// Row dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column maturities in days, ascending.
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Column maturities converted to years.
    pub fn maturities_in_years(&self, day_basis: f64) -> Vec<f64> {
        self.maturities.iter().map(|m| m / day_basis).collect()
    }

    /// The values, one row per date.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The first row for `date`.
    pub fn row(&self, date: NaiveDate) -> Option<ArrayView1<'_, f64>> {
        let i = self.dates.iter().position(|d| *d == date)?;
        Some(self.values.row(i))
    }

    /// The cell at `(date, maturity)`. `Some(NaN)` means the date has no
    /// value at a maturity another date does.
    pub fn get(&self, date: NaiveDate, maturity: f64) -> Option<f64> {
        let i = self.dates.iter().position(|d| *d == date)?;
        let j = self
            .maturities
            .binary_search_by(|m| m.total_cmp(&maturity))
            .ok()?;
        Some(self.values[[i, j]])
    }

    /// Maturity × date view of the values.
    pub fn transpose(&self) -> ArrayView2<'_, f64> {
        self.values.t()
    }
}
