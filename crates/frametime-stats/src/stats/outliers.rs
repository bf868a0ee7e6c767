//! Outlier detection and adjustment for frametime sequences.
//!
//! Capture glitches (a hitch in the capture tool, not in the game) show up as
//! isolated spikes or drops. Adjustment replaces every detected sample with the
//! median of its non-outlier neighbours so that percentile and time-weighted
//! metrics are not skewed, while the sequence keeps its length and its index
//! alignment with the start-time column.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::percentiles::{quantile_sorted, sample_std_dev, sorted_ascending};
use crate::error::{Result, StatsError};

/// Half-width of the neighbourhood used to pick a replacement value.
const REPLACEMENT_RADIUS: usize = 5;

/// Quantile above which `DeciPercentile` flags samples.
const DECI_PERCENTILE: f64 = 0.999;

/// Scale factor turning a MAD into a consistent estimate of sigma.
const MAD_SCALE: f64 = 1.4826;

/// Policy used to neutralise contaminated samples before metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemoveOutlierMethod {
    /// Leave the sequence untouched
    #[default]
    None,
    /// Samples at or above the 99.9th percentile
    DeciPercentile,
    /// Samples outside [Q1 - 1.5*IQR, Q3 + 1.5*IQR]
    InterquartileRange,
    /// Samples further than 3 standard deviations from the mean
    ThreeSigma,
    /// Samples further than 2.5 standard deviations from the mean
    TwoDotFiveSigma,
    /// Hampel identifier: further than 3 scaled MADs from the median
    MedianAbsoluteDeviation,
}

/// Outlier detection using Interquartile Range (IQR) method.
///
/// Outliers are detected as points that fall outside the range
/// [Q1 - 1.5*IQR, Q3 + 1.5*IQR], where IQR = Q3 - Q1.
#[derive(Debug, Clone)]
pub struct OutlierResult {
    /// Indices of detected outliers in the input samples
    pub outlier_indices: Vec<usize>,
    /// Lower fence (Q1 - 1.5*IQR)
    pub lower_fence: f64,
    /// Upper fence (Q3 + 1.5*IQR)
    pub upper_fence: f64,
    /// First quartile (25th percentile)
    pub q1: f64,
    /// Third quartile (75th percentile)
    pub q3: f64,
    /// Interquartile range (Q3 - Q1)
    pub iqr: f64,
}

impl OutlierResult {
    /// Detect outliers in samples using IQR method.
    ///
    /// Fewer than four samples never yield outliers.
    ///
    /// # Examples
    ///
    /// ```
    /// use frametime_stats::stats::outliers::OutlierResult;
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]; // 100.0 is an outlier
    /// let result = OutlierResult::detect(&data).unwrap();
    /// assert!(result.has_outliers());
    /// assert_eq!(result.outlier_indices, vec![5]);
    /// ```
    pub fn detect(samples: &[f64]) -> Result<Self> {
        crate::error::validate_sequence(samples)?;

        if samples.len() < 4 {
            return Ok(OutlierResult {
                outlier_indices: Vec::new(),
                lower_fence: f64::NEG_INFINITY,
                upper_fence: f64::INFINITY,
                q1: samples[0],
                q3: samples[samples.len() - 1],
                iqr: 0.0,
            });
        }

        let sorted = sorted_ascending(samples);
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let outlier_indices: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter_map(|(i, &value)| {
                if value < lower_fence || value > upper_fence {
                    Some(i)
                } else {
                    None
                }
            })
            .collect();

        Ok(OutlierResult {
            outlier_indices,
            lower_fence,
            upper_fence,
            q1,
            q3,
            iqr,
        })
    }

    /// Check if any outliers were detected.
    pub fn has_outliers(&self) -> bool {
        !self.outlier_indices.is_empty()
    }
}

/// Flag the outliers of `samples` according to `method`.
///
/// The returned mask has one entry per sample. Sequences shorter than two
/// samples and sequences without spread never contain outliers.
pub fn detect_outliers(samples: &[f64], method: RemoveOutlierMethod) -> Result<Vec<bool>> {
    let mut mask = vec![false; samples.len()];
    if samples.len() < 2 || method == RemoveOutlierMethod::None {
        return Ok(mask);
    }
    crate::error::validate_sequence(samples)?;

    let sorted = sorted_ascending(samples);
    let median = quantile_sorted(&sorted, 0.5);

    match method {
        RemoveOutlierMethod::None => {}
        RemoveOutlierMethod::DeciPercentile => {
            let threshold = quantile_sorted(&sorted, DECI_PERCENTILE);
            if threshold > median {
                for (flag, &value) in mask.iter_mut().zip(samples) {
                    *flag = value >= threshold;
                }
            }
        }
        RemoveOutlierMethod::InterquartileRange => {
            for index in OutlierResult::detect(samples)?.outlier_indices {
                mask[index] = true;
            }
        }
        RemoveOutlierMethod::ThreeSigma | RemoveOutlierMethod::TwoDotFiveSigma => {
            let k = if method == RemoveOutlierMethod::ThreeSigma {
                3.0
            } else {
                2.5
            };
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            let sigma = sample_std_dev(samples)?;
            if sigma > 0.0 {
                for (flag, &value) in mask.iter_mut().zip(samples) {
                    *flag = (value - mean).abs() > k * sigma;
                }
            }
        }
        RemoveOutlierMethod::MedianAbsoluteDeviation => {
            let deviations: Vec<f64> = samples.iter().map(|v| (v - median).abs()).collect();
            let mad = quantile_sorted(&sorted_ascending(&deviations), 0.5);
            // A zero MAD means more than half the samples are identical; treat as clean.
            if mad > 0.0 {
                let limit = 3.0 * MAD_SCALE * mad;
                for (flag, deviation) in mask.iter_mut().zip(deviations) {
                    *flag = deviation > limit;
                }
            }
        }
    }

    Ok(mask)
}

/// Replace outliers in `sequence` according to `method`.
///
/// The result always has the same length as the input. Each flagged sample is
/// replaced with the median of the clean samples within
/// `REPLACEMENT_RADIUS` positions, or with the median of all clean samples when
/// its neighbourhood is entirely contaminated.
///
/// # Examples
///
/// ```
/// use frametime_stats::stats::outliers::{adjust, RemoveOutlierMethod};
///
/// let frametimes = vec![10.0, 10.2, 9.9, 10.1, 250.0, 10.0, 9.8, 10.1];
/// let adjusted = adjust(&frametimes, RemoveOutlierMethod::InterquartileRange).unwrap();
/// assert_eq!(adjusted.len(), frametimes.len());
/// assert!(adjusted[4] < 11.0);
/// ```
pub fn adjust(sequence: &[f64], method: RemoveOutlierMethod) -> Result<Vec<f64>> {
    if sequence.len() < 2 || method == RemoveOutlierMethod::None {
        return Ok(sequence.to_vec());
    }

    let mask = detect_outliers(sequence, method)?;
    let outlier_count = mask.iter().filter(|&&flag| flag).count();
    if outlier_count == 0 {
        return Ok(sequence.to_vec());
    }

    let clean: Vec<f64> = sequence
        .iter()
        .zip(&mask)
        .filter(|&(_, &flag)| !flag)
        .map(|(&value, _)| value)
        .collect();
    if clean.is_empty() {
        return Err(StatsError::EmptySequence);
    }
    let global_median = quantile_sorted(&sorted_ascending(&clean), 0.5);

    let adjusted = sequence
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if !mask[i] {
                return value;
            }
            let start = i.saturating_sub(REPLACEMENT_RADIUS);
            let end = (i + REPLACEMENT_RADIUS + 1).min(sequence.len());
            let neighbours: Vec<f64> = (start..end)
                .filter(|&j| !mask[j])
                .map(|j| sequence[j])
                .collect();
            if neighbours.is_empty() {
                global_median
            } else {
                quantile_sorted(&sorted_ascending(&neighbours), 0.5)
            }
        })
        .collect();

    debug!(
        ?method,
        outlier_count,
        sample_count = sequence.len(),
        "replaced outliers"
    );
    Ok(adjusted)
}
