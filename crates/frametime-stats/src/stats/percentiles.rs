//! Order statistics over frametime sequences.
//!
//! All percentile lookups use linear interpolation between the closest ranks of
//! an ascending sorted copy (`rank = p * (N - 1)`). The same convention backs
//! every percentile metric, the IQR fences and the cross-run median, so values
//! stay comparable across the crate.

use serde::{Deserialize, Serialize};

use crate::error::{validate_sequence, Result, StatsError};

/// Return an ascending sorted copy of `samples`.
///
/// Callers validate for NaN first; the comparator falls back to `Equal` so a
/// stray NaN can never panic the sort.
pub fn sorted_ascending(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Interpolated quantile of an already sorted, non-empty slice.
///
/// `q` is a fraction in `0.0..=1.0`.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = q * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        sorted[lower_index]
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let fraction = rank - lower_index as f64;
        lower_value + fraction * (upper_value - lower_value)
    }
}

/// Calculate a percentile (`p` in `0.0..=100.0`) of `samples`.
///
/// # Errors
///
/// * [`StatsError::EmptySequence`] if `samples` is empty
/// * [`StatsError::InvalidPercentile`] if `p` is outside `0..=100`
/// * [`StatsError::NonFiniteSample`] if a sample is NaN or infinite
///
/// # Examples
///
/// ```
/// use frametime_stats::stats::percentiles::percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&data, 50.0), Ok(3.0));
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }
    quantile(samples, p / 100.0)
}

/// Calculate the `q` quantile (`q` in `0.0..=1.0`) of `samples`.
pub fn quantile(samples: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::InvalidPercentile(q * 100.0));
    }
    validate_sequence(samples)?;
    Ok(quantile_sorted(&sorted_ascending(samples), q))
}

/// Median of `samples`; even lengths interpolate between the two middle ranks.
pub fn median(samples: &[f64]) -> Result<f64> {
    quantile(samples, 0.5)
}

/// Arithmetic mean of `samples`.
pub fn mean(samples: &[f64]) -> Result<f64> {
    validate_sequence(samples)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator). A single sample has zero spread.
pub fn sample_std_dev(samples: &[f64]) -> Result<f64> {
    let mean = mean(samples)?;
    if samples.len() < 2 {
        return Ok(0.0);
    }
    let squared_diffs: f64 = samples.iter().map(|&x| (x - mean).powi(2)).sum();
    Ok((squared_diffs / (samples.len() - 1) as f64).sqrt())
}

/// Calculate common percentiles in one pass.
///
/// Provides a statistical summary of a frametime sequence including extrema,
/// quartiles, mean, standard deviation and the p95/p99 tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub min: f64,
    pub p25: f64,
    pub p50: f64, // median
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl PercentileSummary {
    /// Compute summary statistics from samples.
    ///
    /// # Examples
    ///
    /// ```
    /// use frametime_stats::stats::percentiles::PercentileSummary;
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    /// let summary = PercentileSummary::from_samples(&data).unwrap();
    /// assert_eq!(summary.count, 10);
    /// assert_eq!(summary.mean, 5.5);
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.max, 10.0);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        validate_sequence(samples)?;

        let sorted = sorted_ascending(samples);
        let count = sorted.len();

        Ok(PercentileSummary {
            min: sorted[0],
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.50),
            p75: quantile_sorted(&sorted, 0.75),
            p95: quantile_sorted(&sorted, 0.95),
            p99: quantile_sorted(&sorted, 0.99),
            max: sorted[count - 1],
            mean: mean(&sorted)?,
            std_dev: sample_std_dev(&sorted)?,
            count,
        })
    }

    /// Coefficient of variation (std_dev / mean), `f64::INFINITY` for a zero mean.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.std_dev / self.mean
        }
    }
}
