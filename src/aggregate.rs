use crate::model::{AggregatedSeries, Sample};
use crate::stats::Accumulator;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Group samples by date and average the values sharing a date.
///
/// Input order does not matter; the result is sorted by date. Empty input
/// gives an empty series, which the later stages reject.
pub fn aggregate(samples: &[Sample]) -> AggregatedSeries {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.date).or_default().add(sample.value);
    }

    let (dates, values): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .map(|(date, acc)| (date, acc.report().mean))
        .unzip();

    AggregatedSeries::from_sorted(dates, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn same_date_samples_are_averaged() {
        let series = aggregate(&[Sample::new(day(1), 10.0), Sample::new(day(1), 20.0)]);
        assert_eq!(series.dates(), &[day(1)]);
        assert_eq!(series.values(), &[15.0]);
    }

    #[test]
    fn single_sample_date_is_unchanged() {
        let series = aggregate(&[Sample::new(day(4), 1234.5)]);
        assert_eq!(series.values(), &[1234.5]);
    }

    #[test]
    fn output_is_sorted_and_unique() {
        let samples = [
            Sample::new(day(3), 15.0),
            Sample::new(day(1), 8.0),
            Sample::new(day(2), 20.0),
            Sample::new(day(1), 12.0),
            Sample::new(day(3), 15.0),
        ];
        let series = aggregate(&samples);
        assert_eq!(series.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(series.values(), &[10.0, 20.0, 15.0]);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(3)));
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = aggregate(&[]);
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }
}
