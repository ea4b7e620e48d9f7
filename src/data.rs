use crate::config::InputConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::model::Sample;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::{fs::File, io::Read, path::Path};

/// Load all samples from a CSV file.
pub fn load_samples<P: AsRef<Path>>(file: P, input: &InputConfig) -> Result<Vec<Sample>> {
    let file = file.as_ref();
    let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;

    let samples = read_samples(reader, input, &file.display().to_string())
        .with_context(|| format!("failed to read samples from {file:?}"))?;

    log::info!("read {} samples from {file:?}", samples.len());

    Ok(samples)
}

/// Read samples from CSV data with a header row.
///
/// Columns are located by header name. `source` only labels error locations.
///
/// # Errors
/// Returns [`MonitorError::Input`] on a missing column, a malformed record,
/// or a date or value that does not parse.
pub fn read_samples<R: Read>(
    reader: R,
    input: &InputConfig,
    source: &str,
) -> MonitorResult<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| MonitorError::input(format!("failed to read header: {err}"), source))?
        .clone();
    let date_col = find_column(&headers, &input.date_column, source)?;
    let value_col = find_column(&headers, &input.value_column, source)?;

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| MonitorError::input(err.to_string(), source))?;
        let line = record.position().map_or(0, |pos| pos.line());
        let location = format!("{source}:{line}");

        let date_str = record.get(date_col).unwrap_or_default();
        let date = parse_date(date_str, &input.date_format).ok_or_else(|| {
            MonitorError::input(
                format!("cannot parse date {date_str:?} with format {:?}", input.date_format),
                location.clone(),
            )
        })?;

        let value_str = record.get(value_col).unwrap_or_default();
        let value = parse_value(value_str)
            .ok_or_else(|| MonitorError::input(format!("invalid value {value_str:?}"), location))?;

        samples.push(Sample::new(date, value));
    }

    Ok(samples)
}

fn find_column(headers: &csv::StringRecord, name: &str, source: &str) -> MonitorResult<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| MonitorError::input(format!("missing column {name:?}"), source))
}

/// Parse a date with `format`, falling back to date-time forms truncated to their date.
pub fn parse_date(s: &str, format: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_value(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|val| val.is_finite())
}
