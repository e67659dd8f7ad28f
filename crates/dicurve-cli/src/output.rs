//! Output formatting utilities.

use std::io::Write;

use colored::Colorize;
use dicurve_curves::{BatchReport, CurveTable};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;
use crate::error::CliResult;

/// Units for the maturity columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaturityUnit {
    /// Calendar days, as fitted.
    Days,
    /// Years on the given day basis.
    Years(f64),
}

impl MaturityUnit {
    fn label(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Years(_) => "years",
        }
    }

    fn columns(self, table: &CurveTable) -> Vec<f64> {
        match self {
            Self::Days => table.maturities().to_vec(),
            Self::Years(day_basis) => table.maturities_in_years(day_basis),
        }
    }
}

#[derive(Serialize)]
struct TableDocument<'a> {
    unit: &'static str,
    maturities: Vec<f64>,
    rows: Vec<RowDocument<'a>>,
}

#[derive(Serialize)]
struct RowDocument<'a> {
    date: &'a chrono::NaiveDate,
    values: Vec<Option<f64>>,
}

/// Writes the curve table in the requested format.
pub fn write_table<W: Write>(
    out: &mut W,
    table: &CurveTable,
    unit: MaturityUnit,
    format: OutputFormat,
) -> CliResult<()> {
    let maturities = unit.columns(table);
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            let mut header = vec!["date".to_string()];
            header.extend(maturities.iter().map(|m| format_maturity(*m)));
            wtr.write_record(&header)?;

            for (date, row) in table.dates().iter().zip(table.values().rows()) {
                let mut record = vec![date.to_string()];
                record.extend(row.iter().map(|v| format_cell(*v, "")));
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            let document = TableDocument {
                unit: unit.label(),
                maturities,
                rows: table
                    .dates()
                    .iter()
                    .zip(table.values().rows())
                    .map(|(date, row)| RowDocument {
                        date,
                        values: row.iter().map(|v| v.is_finite().then_some(*v)).collect(),
                    })
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            if table.is_empty() {
                writeln!(out, "No curves.")?;
                return Ok(());
            }
            let mut builder = Builder::default();
            let mut header = vec![format!("date \\ {}", unit.label())];
            header.extend(maturities.iter().map(|m| format_maturity(*m)));
            builder.push_record(header);

            for (date, row) in table.dates().iter().zip(table.values().rows()) {
                let mut record = vec![date.to_string()];
                record.extend(row.iter().map(|v| format_cell(*v, "-")));
                builder.push_record(record);
            }

            let rendered = builder
                .build()
                .with(Style::rounded())
                .with(Modify::new(Columns::first()).with(Alignment::left()))
                .to_string();
            writeln!(out, "{rendered}")?;
        }
    }
    Ok(())
}

/// Prints rows that implement [`Tabled`] and [`Serialize`].
pub fn write_rows<W: Write, T: Serialize + Tabled>(
    out: &mut W,
    rows: &[T],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::first()).with(Alignment::left()))
                .to_string();
            writeln!(out, "{table}")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

/// Prints the run summary to stderr.
pub fn print_report(report: &BatchReport) {
    let summary = format!(
        "{} dates: {} fitted, {} skipped, {} errored",
        report.requested, report.fitted, report.skipped, report.errored
    );
    if report.missing() == 0 {
        print_success(&summary);
    } else {
        print_warning(&summary);
    }
}

/// Prints a success message.
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair from a float.
    pub fn from_f64(key: impl Into<String>, value: f64, precision: usize) -> Self {
        Self {
            key: key.into(),
            value: format!("{value:.precision$}"),
        }
    }
}

/// Maturities print without trailing zeros; grid points are rarely integers.
fn format_maturity(m: f64) -> String {
    let text = format!("{m:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn format_cell(v: f64, missing: &str) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else {
        missing.to_string()
    }
}
