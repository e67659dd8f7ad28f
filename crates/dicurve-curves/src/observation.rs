//! Observed (maturity, rate) points for one date.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// A single observed point on a day's curve.
///
/// Maturity is in calendar days to expiry. The rate may be in percent or as
/// a decimal; the fitters never look at its unit, but a set must be
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Days to maturity, strictly positive.
    pub maturity: f64,
    /// Observed rate.
    pub rate: f64,
}

impl Observation {
    /// Creates a validated observation.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::MalformedInput`] if either value is non-finite or
    /// the maturity is not strictly positive.
    pub fn new(maturity: f64, rate: f64) -> CurveResult<Self> {
        let obs = Self { maturity, rate };
        obs.validate()?;
        Ok(obs)
    }

    fn validate(&self) -> CurveResult<()> {
        if !self.maturity.is_finite() || self.maturity <= 0.0 {
            return Err(CurveError::malformed_input(format!(
                "maturity must be finite and positive, got {}",
                self.maturity
            )));
        }
        if !self.rate.is_finite() {
            return Err(CurveError::malformed_input(format!(
                "rate at maturity {} is not finite: {}",
                self.maturity, self.rate
            )));
        }
        Ok(())
    }
}

/// How repeated maturities are collapsed before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMaturityPolicy {
    /// Keep the first occurrence in input order.
    First,
    /// Keep the last occurrence in input order.
    Last,
    /// Use the mean of all rates at that maturity.
    #[default]
    Average,
}

/// The observations for a single date.
///
/// Order is preserved as given; the set may be unsorted, contain repeated
/// maturities, or be too small for a particular fitter. Every value is
/// finite and every maturity positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    /// Creates a set from observations, validating each one.
    pub fn new(observations: Vec<Observation>) -> CurveResult<Self> {
        for obs in &observations {
            obs.validate()?;
        }
        Ok(Self { observations })
    }

    /// Creates a set from two parallel columns.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::MalformedInput`] if the columns differ in length
    /// or contain invalid values.
    pub fn from_columns(maturities: &[f64], rates: &[f64]) -> CurveResult<Self> {
        if maturities.len() != rates.len() {
            return Err(CurveError::malformed_input(format!(
                "maturity and rate columns differ in length: {} vs {}",
                maturities.len(),
                rates.len()
            )));
        }
        Self::from_pairs(maturities.iter().copied().zip(rates.iter().copied()))
    }

    /// Creates a set from `(maturity, rate)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> CurveResult<Self> {
        pairs
            .into_iter()
            .map(|(maturity, rate)| Observation::new(maturity, rate))
            .collect::<CurveResult<Vec<_>>>()
            .map(|observations| Self { observations })
    }

    /// Number of observations, repeats included.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterates over the observations in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// The observations in input order.
    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    /// Maturity column in input order.
    pub fn maturities(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.maturity).collect()
    }

    /// Rate column in input order.
    pub fn rates(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    /// Number of distinct maturities.
    pub fn distinct_maturities(&self) -> usize {
        let mut maturities = self.maturities();
        maturities.sort_by(f64::total_cmp);
        maturities.dedup();
        maturities.len()
    }

    /// Smallest and largest maturity, or `None` for an empty set.
    pub fn maturity_range(&self) -> Option<(f64, f64)> {
        self.observations.iter().fold(None, |acc, o| match acc {
            None => Some((o.maturity, o.maturity)),
            Some((lo, hi)) => Some((lo.min(o.maturity), hi.max(o.maturity))),
        })
    }

    /// Returns the maturities sorted ascending with repeats collapsed, and
    /// the matching rates.
    pub fn sorted_deduplicated(&self, policy: DuplicateMaturityPolicy) -> (Vec<f64>, Vec<f64>) {
        // Stable sort keeps input order among equal maturities for First/Last
        let mut sorted = self.observations.clone();
        sorted.sort_by(|a, b| a.maturity.total_cmp(&b.maturity));

        let mut maturities = Vec::with_capacity(sorted.len());
        let mut rates = Vec::with_capacity(sorted.len());

        let mut start = 0;
        while start < sorted.len() {
            let end = sorted[start..]
                .iter()
                .position(|o| o.maturity != sorted[start].maturity)
                .map_or(sorted.len(), |offset| start + offset);
            let group = &sorted[start..end];
            start = end;

            let rate = match policy {
                DuplicateMaturityPolicy::First => group[0].rate,
                DuplicateMaturityPolicy::Last => group[group.len() - 1].rate,
                DuplicateMaturityPolicy::Average => {
                    group.iter().map(|o| o.rate).sum::<f64>() / group.len() as f64
                }
            };
            maturities.push(group[0].maturity);
            rates.push(rate);
        }

        (maturities, rates)
    }
}

impl TryFrom<Vec<Observation>> for ObservationSet {
    type Error = CurveError;

    fn try_from(observations: Vec<Observation>) -> CurveResult<Self> {
        Self::new(observations)
    }
}

impl From<ObservationSet> for Vec<Observation> {
    fn from(set: ObservationSet) -> Self {
        set.observations
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
