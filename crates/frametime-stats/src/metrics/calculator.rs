//! Metric dispatch and the low-percentage, stutter and variance families.
//!
//! Percentile convention: `Pxx` is the `xx / 100` quantile (linear
//! interpolation, see [`crate::stats::percentiles`]) of the domain the metric
//! is reported in. For frametimes that makes `P99` a near-worst frame and `P1`
//! a near-best one; for FPS it makes `P1` the familiar "1% percentile" low.

use tracing::{debug, instrument};

use crate::config::StatisticsConfig;
use crate::error::{validate_frametimes, validate_sequence, Result, StatsError};
use crate::metrics::Metric;
use crate::stats::filter::moving_average;
use crate::stats::percentiles::{quantile_sorted, sorted_ascending, PercentileSummary};

/// Upper bounds (ms) of the frame-to-frame variance bins; the last bin is open.
const VARIANCE_BIN_LIMITS: [f64; 4] = [2.0, 4.0, 8.0, 12.0];

/// Round half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

fn fps(frametime_ms: f64) -> f64 {
    1000.0 / frametime_ms
}

/// Mean of the slowest `ceil(fraction * N)` frametimes (at least one).
///
/// ```
/// use frametime_stats::metrics::calculator::low_average_frametime;
///
/// let mut frametimes = vec![10.0; 99];
/// frametimes.push(100.0);
/// assert_eq!(low_average_frametime(&frametimes, 0.01), Ok(100.0));
/// ```
pub fn low_average_frametime(frametimes: &[f64], fraction: f64) -> Result<f64> {
    validate_sequence(frametimes)?;
    let n = frametimes.len();
    // Tolerance keeps products like 0.01 * 300 from rounding up to an extra frame.
    let count = ((fraction * n as f64 - 1e-9).ceil().max(1.0) as usize).min(n);

    let sorted = sorted_ascending(frametimes);
    let slowest = &sorted[n - count..];
    Ok(slowest.iter().sum::<f64>() / count as f64)
}

/// The slowest frames that together cover `fraction` of the total capture time.
///
/// Frametimes are sorted descending and accumulated until their sum reaches
/// `fraction` of the session duration; exactly those frames are returned.
pub fn low_integral_subset(frametimes: &[f64], fraction: f64) -> Result<Vec<f64>> {
    validate_sequence(frametimes)?;

    let mut descending = sorted_ascending(frametimes);
    descending.reverse();

    let total: f64 = descending.iter().sum();
    let target = total * fraction;

    let mut accumulated = 0.0;
    let mut count = 0;
    for frametime in &descending {
        accumulated += frametime;
        count += 1;
        if accumulated >= target {
            break;
        }
    }

    descending.truncate(count);
    Ok(descending)
}

/// Computes named metrics with an explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct MetricCalculator {
    config: StatisticsConfig,
}

impl MetricCalculator {
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    fn round(&self, value: f64) -> f64 {
        round_to(value, self.config.fps_rounding_digits)
    }

    /// Compute an FPS metric from a frametime sequence (ms).
    ///
    /// # Errors
    ///
    /// * [`StatsError::EmptySequence`] for an empty sequence
    /// * [`StatsError::NonFiniteSample`] / [`StatsError::NonPositiveFrametime`] for bad samples
    /// * [`StatsError::UnknownMetric`] for `Metric::None` and the power metrics
    #[instrument(level = "debug", skip(self, frametimes), fields(samples = frametimes.len()))]
    pub fn fps_metric(&self, frametimes: &[f64], metric: Metric) -> Result<f64> {
        validate_frametimes(frametimes)?;

        let fps_values: Vec<f64> = frametimes.iter().map(|&ft| fps(ft)).collect();
        let fps_quantile = |q: f64| quantile_sorted(&sorted_ascending(&fps_values), q);

        let value = match metric {
            Metric::Max => fps_values.iter().copied().fold(f64::MIN, f64::max),
            Metric::Min => fps_values.iter().copied().fold(f64::MAX, f64::min),
            Metric::P99 => fps_quantile(0.99),
            Metric::P95 => fps_quantile(0.95),
            Metric::Median => fps_quantile(0.5),
            Metric::P5 => fps_quantile(0.05),
            Metric::P1 | Metric::GpuActiveP1 => fps_quantile(0.01),
            Metric::P0dot2 => fps_quantile(0.002),
            Metric::P0dot1 => fps_quantile(0.001),
            Metric::Average | Metric::GpuActiveAverage | Metric::CpuActiveAverage => {
                average_fps(frametimes)
            }
            Metric::OnePercentLowAverage | Metric::GpuActiveOnePercentLowAverage => {
                fps(low_average_frametime(frametimes, 0.01)?)
            }
            Metric::ZerodotTwoPercentLowAverage => fps(low_average_frametime(frametimes, 0.002)?),
            Metric::ZerodotOnePercentLowAverage => fps(low_average_frametime(frametimes, 0.001)?),
            Metric::OnePercentLowIntegral => low_integral_fps(frametimes, 0.01)?,
            Metric::ZerodotTwoPercentLowIntegral => low_integral_fps(frametimes, 0.002)?,
            Metric::ZerodotOnePercentLowIntegral => low_integral_fps(frametimes, 0.001)?,
            Metric::AdaptiveStd => {
                let mean_frametime = frametimes.iter().sum::<f64>() / frametimes.len() as f64;
                self.adaptive_standard_deviation(&fps_values, mean_frametime)?
            }
            Metric::CpuFpsPerWatt | Metric::GpuFpsPerWatt | Metric::None => {
                return Err(StatsError::UnknownMetric(metric))
            }
        };

        Ok(self.round(value))
    }

    /// Compute a frametime metric (ms) from a frametime sequence (ms).
    ///
    /// Percentiles follow the frametime convention, so for any sequence
    /// `Min <= P0.1 <= P0.2 <= P1 <= P5 <= Median <= P95 <= P99 <= Max`.
    #[instrument(level = "debug", skip(self, frametimes), fields(samples = frametimes.len()))]
    pub fn frametime_metric(&self, frametimes: &[f64], metric: Metric) -> Result<f64> {
        validate_frametimes(frametimes)?;

        let sorted = sorted_ascending(frametimes);
        let mean = frametimes.iter().sum::<f64>() / frametimes.len() as f64;

        let value = match metric {
            Metric::Max => sorted[sorted.len() - 1],
            Metric::Min => sorted[0],
            Metric::P99 => quantile_sorted(&sorted, 0.99),
            Metric::P95 => quantile_sorted(&sorted, 0.95),
            Metric::Median => quantile_sorted(&sorted, 0.5),
            Metric::P5 => quantile_sorted(&sorted, 0.05),
            Metric::P1 | Metric::GpuActiveP1 => quantile_sorted(&sorted, 0.01),
            Metric::P0dot2 => quantile_sorted(&sorted, 0.002),
            Metric::P0dot1 => quantile_sorted(&sorted, 0.001),
            Metric::Average | Metric::GpuActiveAverage | Metric::CpuActiveAverage => mean,
            Metric::OnePercentLowAverage | Metric::GpuActiveOnePercentLowAverage => {
                low_average_frametime(frametimes, 0.01)?
            }
            Metric::ZerodotTwoPercentLowAverage => low_average_frametime(frametimes, 0.002)?,
            Metric::ZerodotOnePercentLowAverage => low_average_frametime(frametimes, 0.001)?,
            Metric::OnePercentLowIntegral => low_integral_frametime(frametimes, 0.01)?,
            Metric::ZerodotTwoPercentLowIntegral => low_integral_frametime(frametimes, 0.002)?,
            Metric::ZerodotOnePercentLowIntegral => low_integral_frametime(frametimes, 0.001)?,
            Metric::AdaptiveStd => self.adaptive_standard_deviation(frametimes, mean)?,
            Metric::CpuFpsPerWatt | Metric::GpuFpsPerWatt | Metric::None => {
                return Err(StatsError::UnknownMetric(metric))
            }
        };

        Ok(self.round(value))
    }

    /// FPS per 10 W of measured power: `average_fps / (coefficient / 10)`.
    ///
    /// `coefficient` is the average power draw in watts of the CPU or GPU.
    /// The result is rounded to two decimals.
    pub fn physical_metric(&self, frametimes: &[f64], metric: Metric, coefficient: f64) -> Result<f64> {
        if !metric.is_physical() {
            return Err(StatsError::UnknownMetric(metric));
        }
        validate_frametimes(frametimes)?;
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(StatsError::InvalidCoefficient(coefficient));
        }

        Ok(round_to(average_fps(frametimes) / coefficient * 10.0, 2))
    }

    /// Residual standard deviation against a moving average whose width is a
    /// fixed wall-clock window.
    ///
    /// The window `interval_average_window_s` is converted into a sample count
    /// `w = round(1000 * window / mean_frametime_ms)`, so the same wall-clock
    /// span covers more samples at higher frame rates.
    pub fn adaptive_standard_deviation(&self, sequence: &[f64], mean_frametime_ms: f64) -> Result<f64> {
        validate_sequence(sequence)?;
        if !mean_frametime_ms.is_finite() || mean_frametime_ms <= 0.0 {
            return Err(StatsError::InvalidCoefficient(mean_frametime_ms));
        }
        if sequence.len() < 2 {
            return Ok(0.0);
        }

        let window =
            ((1000.0 * self.config.interval_average_window_s / mean_frametime_ms).round() as usize).max(1);
        let smoothed = moving_average(sequence, window)?;

        let sum_residual_squares: f64 = sequence
            .iter()
            .zip(&smoothed)
            .map(|(value, average)| (value - average).powi(2))
            .sum();

        debug!(window, samples = sequence.len(), "adaptive standard deviation");
        Ok((sum_residual_squares / (sequence.len() - 1) as f64).sqrt())
    }

    /// Trailing local baseline used for stutter detection.
    ///
    /// Each entry is the mean of up to `round(10 * sqrt(mean))` preceding
    /// frametimes, excluding the frame itself. The first frame is its own
    /// baseline.
    pub fn stutter_baseline(&self, frametimes: &[f64]) -> Result<Vec<f64>> {
        validate_frametimes(frametimes)?;

        let mean = frametimes.iter().sum::<f64>() / frametimes.len() as f64;
        let window = ((mean.sqrt() * 10.0).round() as usize).max(1);

        let mut baseline = Vec::with_capacity(frametimes.len());
        let mut sum = 0.0;
        for (i, &frametime) in frametimes.iter().enumerate() {
            if i == 0 {
                baseline.push(frametime);
            } else {
                let count = i.min(window);
                baseline.push(sum / count as f64);
            }
            sum += frametime;
            if i >= window {
                sum -= frametimes[i - window];
            }
        }
        Ok(baseline)
    }

    fn stutter_flags(&self, frametimes: &[f64], stuttering_factor: f64) -> Result<Vec<bool>> {
        if !stuttering_factor.is_finite() || stuttering_factor <= 0.0 {
            return Err(StatsError::InvalidCoefficient(stuttering_factor));
        }
        let baseline = self.stutter_baseline(frametimes)?;
        Ok(frametimes
            .iter()
            .zip(&baseline)
            .map(|(&frametime, &base)| frametime > stuttering_factor * base)
            .collect())
    }

    /// Percentage of frames that stutter, counted by frame.
    pub fn stuttering_count_percentage(&self, frametimes: &[f64], stuttering_factor: f64) -> Result<f64> {
        let flags = self.stutter_flags(frametimes, stuttering_factor)?;
        let stutter_count = flags.iter().filter(|&&flag| flag).count();
        Ok(100.0 * stutter_count as f64 / frametimes.len() as f64)
    }

    /// Percentage of capture time spent in stuttering frames.
    pub fn stuttering_time_percentage(&self, frametimes: &[f64], stuttering_factor: f64) -> Result<f64> {
        let flags = self.stutter_flags(frametimes, stuttering_factor)?;
        let stutter_time: f64 = frametimes
            .iter()
            .zip(&flags)
            .filter(|&(_, &flag)| flag)
            .map(|(&frametime, _)| frametime)
            .sum();
        Ok(100.0 * stutter_time / frametimes.iter().sum::<f64>())
    }

    /// Stutter time share against the global average instead of a local baseline.
    ///
    /// Cheaper and stable on short live windows, where a trailing baseline has
    /// too little history.
    pub fn online_stuttering_time_percentage(
        &self,
        frametimes: &[f64],
        stuttering_factor: f64,
    ) -> Result<f64> {
        validate_frametimes(frametimes)?;
        if !stuttering_factor.is_finite() || stuttering_factor <= 0.0 {
            return Err(StatsError::InvalidCoefficient(stuttering_factor));
        }
        let total: f64 = frametimes.iter().sum();
        let limit = stuttering_factor * total / frametimes.len() as f64;
        let stutter_time: f64 = frametimes.iter().filter(|&&ft| ft > limit).sum();
        Ok(100.0 * stutter_time / total)
    }

    /// Percentage of capture time spent below `low_fps_threshold` in frames
    /// that are not already stutters.
    ///
    /// Stutters and low-FPS time are disjoint, so the two shares can be
    /// stacked in a single bar.
    pub fn low_fps_time_percentage(
        &self,
        frametimes: &[f64],
        stuttering_factor: f64,
        low_fps_threshold: f64,
    ) -> Result<f64> {
        if !low_fps_threshold.is_finite() || low_fps_threshold <= 0.0 {
            return Err(StatsError::InvalidCoefficient(low_fps_threshold));
        }
        let flags = self.stutter_flags(frametimes, stuttering_factor)?;
        let low_fps_time: f64 = frametimes
            .iter()
            .zip(&flags)
            .filter(|&(&frametime, &stutter)| !stutter && fps(frametime) < low_fps_threshold)
            .map(|(&frametime, _)| frametime)
            .sum();
        Ok(100.0 * low_fps_time / frametimes.iter().sum::<f64>())
    }

    /// Per-frame deviation from the local baseline in percent.
    pub fn frametime_variance_percentages(&self, frametimes: &[f64]) -> Result<Vec<f64>> {
        let baseline = self.stutter_baseline(frametimes)?;
        Ok(frametimes
            .iter()
            .zip(&baseline)
            .map(|(&frametime, &base)| 100.0 * (frametime - base).abs() / base)
            .collect())
    }

    /// Share of consecutive frame-to-frame changes in the bins
    /// `< 2`, `< 4`, `< 8`, `< 12` and `>= 12` ms, each rounded to four digits.
    pub fn frametime_variance_distribution(&self, frametimes: &[f64]) -> Result<Vec<f64>> {
        validate_frametimes(frametimes)?;
        if frametimes.len() < 2 {
            return Err(StatsError::EmptySequence);
        }

        let mut bins = [0usize; VARIANCE_BIN_LIMITS.len() + 1];
        for pair in frametimes.windows(2) {
            let change = (pair[1] - pair[0]).abs();
            let bin = VARIANCE_BIN_LIMITS
                .iter()
                .position(|&limit| change < limit)
                .unwrap_or(VARIANCE_BIN_LIMITS.len());
            bins[bin] += 1;
        }

        let total = (frametimes.len() - 1) as f64;
        Ok(bins
            .iter()
            .map(|&count| round_to(count as f64 / total, 4))
            .collect())
    }

    /// One-pass percentile summary of a frametime sequence.
    pub fn percentile_summary(&self, frametimes: &[f64]) -> Result<PercentileSummary> {
        validate_frametimes(frametimes)?;
        PercentileSummary::from_samples(frametimes)
    }
}

/// Time-weighted average FPS: frames divided by elapsed seconds.
fn average_fps(frametimes: &[f64]) -> f64 {
    frametimes.len() as f64 * 1000.0 / frametimes.iter().sum::<f64>()
}

fn low_integral_frametime(frametimes: &[f64], fraction: f64) -> Result<f64> {
    let subset = low_integral_subset(frametimes, fraction)?;
    Ok(subset.iter().sum::<f64>() / subset.len() as f64)
}

fn low_integral_fps(frametimes: &[f64], fraction: f64) -> Result<f64> {
    let subset = low_integral_subset(frametimes, fraction)?;
    Ok(subset.iter().map(|&ft| fps(ft)).sum::<f64>() / subset.len() as f64)
}
