//! Curve command implementation.
//!
//! Fits a single date and shows the sampled curve, plus the fitted
//! parameters for the Svensson method.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use dicurve_curves::fitters::{Calibration, SvenssonCurveFitter, SvenssonFit};
use dicurve_curves::{FitMethod, FittedCurve};

use crate::cli::OutputFormat;
use crate::commands::FitOptions;
use crate::error::CliError;
use crate::input::{parse_date, read_observations};
use crate::output::{print_header, write_rows, KeyValue};

/// Arguments for the curve command.
#[derive(Args, Debug)]
pub struct CurveArgs {
    #[command(flatten)]
    pub options: FitOptions,

    /// Date to fit (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long)]
    pub date: String,
}

#[derive(Debug, Serialize, Tabled)]
struct CurvePoint {
    #[tabled(rename = "Days")]
    days: f64,
    #[tabled(rename = "Years")]
    #[tabled(display_with = "four_decimals")]
    years: f64,
    #[tabled(rename = "Rate")]
    #[tabled(display_with = "six_decimals")]
    rate: f64,
}

fn four_decimals(v: &f64) -> String {
    format!("{v:.4}")
}

fn six_decimals(v: &f64) -> String {
    format!("{v:.6}")
}

#[derive(Serialize)]
struct CurveDocument<'a> {
    date: String,
    method: String,
    observations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fit: Option<&'a SvenssonFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<String>,
    points: &'a [CurvePoint],
}

/// Execute the curve command.
pub fn execute(args: CurveArgs, format: OutputFormat) -> Result<()> {
    let config = args.options.resolve_config()?;
    let date = parse_date(&args.date)?;
    let inputs = read_observations(&args.options.input, args.options.delimiter_byte()?)?;
    let observations = inputs
        .into_iter()
        .find_map(|(d, obs)| (d == date).then_some(obs))
        .ok_or(CliError::DateNotFound(date))?;

    let grid = config.grid()?;
    let (curve, calibration) = match config.method {
        FitMethod::Svensson => {
            let calibration =
                SvenssonCurveFitter::with_config(config.svensson).calibrate(&observations)?;
            (calibration.curve(&grid)?, Some(calibration))
        }
        FitMethod::Linear => (config.fitter().fit(&observations, &grid)?, None),
    };
    let fit = calibration.as_ref().and_then(Calibration::fit);

    let points: Vec<CurvePoint> = curve
        .points()
        .map(|(days, rate)| CurvePoint {
            days,
            years: days / config.day_basis,
            rate,
        })
        .collect();
    let skipped = curve.skip_reason().map(|r| r.to_string());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => {
            print_header(&format!("Curve {date}"));
            let mut summary = vec![
                KeyValue::new("Method", config.method.to_string()),
                KeyValue::new("Observations", observations.len().to_string()),
                KeyValue::new("Grid points", grid.len().to_string()),
            ];
            if let Some(fit) = fit {
                summary.extend(parameter_rows(fit));
            }
            if let Some(reason) = &skipped {
                summary.push(KeyValue::new("Skipped", reason.clone()));
            }
            write_rows(&mut out, &summary, format)?;
            if !curve.is_empty() {
                write_rows(&mut out, &points, format)?;
            }
        }
        OutputFormat::Json => {
            let document = CurveDocument {
                date: date.to_string(),
                method: config.method.to_string(),
                observations: observations.len(),
                fit,
                skipped,
                points: &points,
            };
            serde_json::to_writer_pretty(&mut out, &document)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            if let FittedCurve::Empty(reason) = curve {
                return Err(anyhow::anyhow!("{date}: no curve ({reason})"));
            }
            write_rows(&mut out, &points, format)?;
        }
    }

    Ok(())
}

fn parameter_rows(fit: &SvenssonFit) -> Vec<KeyValue> {
    let p = &fit.parameters;
    vec![
        KeyValue::from_f64("β0", p.beta0, 6),
        KeyValue::from_f64("β1", p.beta1, 6),
        KeyValue::from_f64("β2", p.beta2, 6),
        KeyValue::from_f64("β3", p.beta3, 6),
        KeyValue::from_f64("λ1", p.lambda1, 6),
        KeyValue::from_f64("λ2", p.lambda2, 6),
        KeyValue::new("RMSE", format!("{:.3e}", fit.rmse)),
        KeyValue::new("Iterations", fit.iterations.to_string()),
    ]
}
