//! Reading observation files.
//!
//! The input is long-format CSV with one observation per row:
//!
//! ```text
//! date,maturity,rate
//! 2024-12-02,29,11.155
//! 2024-12-02,90,12.020
//! 03/12/2024,29,"11,160"
//! ```
//!
//! Dates may be `YYYY-MM-DD` or `DD/MM/YYYY`, and numbers may use a decimal
//! comma as published by B3. Rows for the same date form one observation
//! set; dates keep the order of their first row.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use dicurve_curves::ObservationSet;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "Date", alias = "data")]
    date: String,
    #[serde(alias = "days", alias = "Maturity", alias = "dias")]
    maturity: String,
    #[serde(alias = "yield", alias = "Rate", alias = "taxa")]
    rate: String,
}

/// Reads and groups observations from a CSV file.
pub fn read_observations(path: &Path, delimiter: u8) -> CliResult<Vec<(NaiveDate, ObservationSet)>> {
    let file = File::open(path)?;
    let dates = read_from(file, delimiter)?;
    debug!("read {} dates from {}", dates.len(), path.display());
    Ok(dates)
}

/// Reads and groups observations from any reader.
pub fn read_from<R: Read>(reader: R, delimiter: u8) -> CliResult<Vec<(NaiveDate, ObservationSet)>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut grouped: Vec<(NaiveDate, Vec<(f64, f64)>)> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: RawRow = record.deserialize(Some(&headers))?;

        let date = parse_date(&row.date)?;
        let maturity = parse_number(&row.maturity).ok_or_else(|| CliError::InvalidNumber {
            line,
            field: "maturity",
            value: row.maturity.clone(),
        })?;
        let rate = parse_number(&row.rate).ok_or_else(|| CliError::InvalidNumber {
            line,
            field: "rate",
            value: row.rate.clone(),
        })?;

        let slot = *index.entry(date).or_insert_with(|| {
            grouped.push((date, Vec::new()));
            grouped.len() - 1
        });
        grouped[slot].1.push((maturity, rate));
    }

    if grouped.is_empty() {
        return Err(CliError::Input("no observations found".to_string()));
    }

    grouped
        .into_iter()
        .map(|(date, pairs)| {
            ObservationSet::from_pairs(pairs)
                .map(|set| (date, set))
                .map_err(|e| CliError::Input(format!("{date}: {e}")))
        })
        .collect()
}

/// Parses `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Parses a number written with a decimal point or a decimal comma.
///
/// With a comma present, dots are read as thousands separators.
pub fn parse_number(s: &str) -> Option<f64> {
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    normalized.parse::<f64>().ok()
}
