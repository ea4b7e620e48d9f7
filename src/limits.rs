//! EWMA control limits.
//!
//! ```text
//! spread   = L * s * sqrt(alpha / (2 - alpha))
//! upper[i] = e[i] + spread
//! lower[i] = e[i] - spread
//! ```
//!
//! where `s` is the sample standard deviation of the raw series and `L` the
//! standard deviation multiplier. The spread is a single scalar, so both
//! limits are parallel offsets of the EWMA curve.

use crate::error::{MonitorError, MonitorResult};
use crate::ewma::{SmoothedSeries, check_alpha};
use crate::stats::Accumulator;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STD_DEV_MULTIPLIER: f64 = 2.0;

/// What to do when the raw series is too short for a sample standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSeriesPolicy {
    /// Treat the standard deviation as 0; the limits collapse onto the EWMA.
    #[default]
    ZeroSpread,
    /// Fail with [`MonitorError::InsufficientData`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlLimits {
    upper: Vec<f64>,
    lower: Vec<f64>,
    spread: f64,
    std_dev: f64,
}

impl ControlLimits {
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Half-width of the band around the EWMA.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Sample standard deviation of the raw series the limits were built from.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Upper limit reduced to its mean, for a flat reference line.
    pub fn mean_upper(&self) -> f64 {
        self.upper.iter().copied().collect::<Accumulator>().report().mean
    }

    /// Lower limit reduced to its mean, for a flat reference line.
    pub fn mean_lower(&self) -> f64 {
        self.lower.iter().copied().collect::<Accumulator>().report().mean
    }

    /// Indices whose value lies strictly outside `[lower, upper]`.
    ///
    /// Values beyond the length of the limits are ignored.
    pub fn breaches(&self, values: &[f64]) -> Vec<usize> {
        values
            .iter()
            .zip(self.upper.iter().zip(&self.lower))
            .enumerate()
            .filter(|(_, (val, (upper, lower)))| *val > *upper || *val < *lower)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Derive control limits for `smoothed` from the raw `values` it was computed from.
///
/// # Errors
/// - [`MonitorError::EmptySeries`] if either series is empty.
/// - [`MonitorError::InvalidParameter`] on mismatched lengths, `alpha` outside
///   (0, 1], or a negative or non-finite multiplier.
/// - [`MonitorError::InsufficientData`] for a single value under
///   [`ShortSeriesPolicy::Reject`].
pub fn control_limits(
    values: &[f64],
    smoothed: &SmoothedSeries,
    alpha: f64,
    std_dev_multiplier: f64,
    policy: ShortSeriesPolicy,
) -> MonitorResult<ControlLimits> {
    check_alpha(alpha)?;
    if !std_dev_multiplier.is_finite() || std_dev_multiplier < 0.0 {
        return Err(MonitorError::invalid(
            "std_dev_multiplier",
            format!("must be finite and non-negative, but is {std_dev_multiplier}"),
        ));
    }
    if values.is_empty() || smoothed.is_empty() {
        return Err(MonitorError::EmptySeries);
    }
    if values.len() != smoothed.len() {
        return Err(MonitorError::invalid(
            "smoothed",
            format!(
                "length must match the raw series ({}), but is {}",
                values.len(),
                smoothed.len()
            ),
        ));
    }

    let report = values.iter().copied().collect::<Accumulator>().report();
    let std_dev = if report.n_vals < 2 {
        match policy {
            ShortSeriesPolicy::ZeroSpread => 0.0,
            ShortSeriesPolicy::Reject => {
                return Err(MonitorError::InsufficientData {
                    n_vals: report.n_vals,
                });
            }
        }
    } else {
        report.std_dev
    };

    let spread = std_dev_multiplier * std_dev * (alpha / (2.0 - alpha)).sqrt();
    let upper = smoothed.values().iter().map(|e| e + spread).collect();
    let lower = smoothed.values().iter().map(|e| e - spread).collect();

    Ok(ControlLimits {
        upper,
        lower,
        spread,
        std_dev,
    })
}
