use crate::aggregate::aggregate;
use crate::config::EwmaConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::ewma::{SmoothedSeries, smooth};
use crate::limits::{ControlLimits, control_limits};
use crate::model::{AggregatedSeries, Sample};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Everything derived from one batch of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub alpha: f64,
    pub std_dev_multiplier: f64,
    /// Number of raw samples before aggregation.
    pub n_samples: usize,
    pub series: AggregatedSeries,
    pub smoothed: SmoothedSeries,
    pub limits: ControlLimits,
    /// Flat reference lines drawn on the chart.
    pub mean_upper: f64,
    pub mean_lower: f64,
    /// Dates whose mean value lies outside the control limits.
    pub breaches: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct ReportRow {
    date: NaiveDate,
    mean_value: f64,
    ewma: f64,
    ucl: f64,
    lcl: f64,
}

/// Aggregate, smooth, and bound `samples`.
///
/// # Errors
/// [`MonitorError::EmptySeries`] if there are no samples, plus any error of
/// [`smooth`] or [`control_limits`].
pub fn run(samples: &[Sample], params: &EwmaConfig) -> MonitorResult<Report> {
    let series = aggregate(samples);
    if series.is_empty() {
        return Err(MonitorError::EmptySeries);
    }

    let smoothed = smooth(series.values(), params.alpha)?;
    let limits = control_limits(
        series.values(),
        &smoothed,
        params.alpha,
        params.std_dev_multiplier,
        params.short_series,
    )?;

    let breaches = limits
        .breaches(series.values())
        .into_iter()
        .map(|idx| series.dates()[idx])
        .collect();

    Ok(Report {
        alpha: params.alpha,
        std_dev_multiplier: params.std_dev_multiplier,
        n_samples: samples.len(),
        mean_upper: limits.mean_upper(),
        mean_lower: limits.mean_lower(),
        series,
        smoothed,
        limits,
        breaches,
    })
}

impl Report {
    pub fn save_json<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Write one row per date: date, mean value, EWMA, UCL and LCL.
    pub fn save_csv<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let mut writer =
            csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

        for row in self.rows() {
            writer.serialize(row).context("failed to serialize row")?;
        }
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    fn rows(&self) -> impl Iterator<Item = ReportRow> + '_ {
        self.series
            .dates()
            .iter()
            .zip(self.series.values())
            .zip(self.smoothed.values())
            .zip(self.limits.upper().iter().zip(self.limits.lower()))
            .map(|(((&date, &mean_value), &ewma), (&ucl, &lcl))| ReportRow {
                date,
                mean_value,
                ewma,
                ucl,
                lcl,
            })
    }
}
