//! Exponentially weighted moving average.
//!
//! ```text
//! e_0 = v_0
//! e_i = alpha * v_i + (1 - alpha) * e_{i-1}
//! ```
//!
//! The seed is the first raw value, so there is no warm-up period.

use crate::error::{MonitorError, MonitorResult};
use serde::Serialize;

pub const DEFAULT_ALPHA: f64 = 0.3;

/// EWMA values aligned index by index with the series they smooth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SmoothedSeries {
    values: Vec<f64>,
}

impl SmoothedSeries {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check that `alpha` lies in (0, 1].
pub fn check_alpha(alpha: f64) -> MonitorResult<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
        return Err(MonitorError::invalid(
            "alpha",
            format!("must be in the range (0, 1], but is {alpha}"),
        ));
    }
    Ok(())
}

/// Smooth `values` with factor `alpha`.
///
/// # Errors
/// [`MonitorError::EmptySeries`] for empty input and
/// [`MonitorError::InvalidParameter`] for `alpha` outside (0, 1].
pub fn smooth(values: &[f64], alpha: f64) -> MonitorResult<SmoothedSeries> {
    check_alpha(alpha)?;
    let (&first, rest) = values.split_first().ok_or(MonitorError::EmptySeries)?;

    let mut smoothed = Vec::with_capacity(values.len());
    smoothed.push(first);
    let mut prev = first;
    for &val in rest {
        prev = alpha * val + (1.0 - alpha) * prev;
        smoothed.push(prev);
    }

    Ok(SmoothedSeries { values: smoothed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    const TOL: f64 = 1e-10;

    #[test]
    fn single_value_is_its_own_ewma() {
        let smoothed = smooth(&[15.0], DEFAULT_ALPHA).unwrap();
        assert_eq!(smoothed.values(), &[15.0]);
    }

    #[test]
    fn three_point_series() {
        let smoothed = smooth(&[10.0, 20.0, 15.0], 0.3).unwrap();
        let expected = [10.0, 13.0, 13.6];
        assert_eq!(smoothed.len(), 3);
        for (got, want) in smoothed.values().iter().zip(expected) {
            assert!((got - want).abs() < TOL, "{got} != {want}");
        }
    }

    #[test]
    fn alpha_one_tracks_raw_values() {
        let values = [3.0, -1.0, 8.5, 2.0];
        let smoothed = smooth(&values, 1.0).unwrap();
        assert_eq!(smoothed.values(), &values);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(smooth(&[], 0.3), Err(MonitorError::EmptySeries));
    }

    #[test]
    fn alpha_out_of_range_is_rejected() {
        for alpha in [0.0, -0.2, 1.0001, f64::NAN, f64::INFINITY] {
            let err = smooth(&[1.0, 2.0], alpha).unwrap_err();
            assert!(
                matches!(err, MonitorError::InvalidParameter { name: "alpha", .. }),
                "alpha {alpha} gave {err:?}"
            );
        }
    }

    #[test]
    fn recurrence_holds_on_random_series() {
        let mut rng = ChaCha12Rng::seed_from_u64(17);
        for _ in 0..50 {
            let n_vals = rng.random_range(1..200);
            let alpha = rng.random_range(0.01..=1.0);
            let values: Vec<f64> = (0..n_vals).map(|_| rng.random_range(0.0..1e6)).collect();

            let smoothed = smooth(&values, alpha).unwrap();
            let e = smoothed.values();
            assert_eq!(e.len(), values.len());
            assert_eq!(e[0], values[0]);
            for i in 1..e.len() {
                let want = alpha * values[i] + (1.0 - alpha) * e[i - 1];
                assert!((e[i] - want).abs() <= TOL * want.abs().max(1.0));
            }
        }
    }

    #[test]
    fn matches_closed_form() {
        let values = [4.0, 9.0, 1.0, 7.0, 7.0, 2.0];
        let alpha: f64 = 0.25;
        let e = smooth(&values, alpha).unwrap();
        // e_i = (1-a)^i v_0 + sum_{k=1}^{i} a (1-a)^{i-k} v_k
        for i in 0..values.len() {
            let mut want = (1.0 - alpha).powi(i as i32) * values[0];
            for k in 1..=i {
                want += alpha * (1.0 - alpha).powi((i - k) as i32) * values[k];
            }
            assert!((e.values()[i] - want).abs() < TOL);
        }
    }
}
