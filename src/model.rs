//! Monitoring data types.

use chrono::NaiveDate;
use serde::Serialize;

/// A single raw measurement. Several samples may share a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub value: f64,
}

impl Sample {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One mean value per distinct date, ordered by date ascending.
///
/// Built by [`crate::aggregate::aggregate`], which guarantees that dates are
/// unique and sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl AggregatedSeries {
    pub(crate) fn from_sorted(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Mean value per date, aligned with [`AggregatedSeries::dates`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
