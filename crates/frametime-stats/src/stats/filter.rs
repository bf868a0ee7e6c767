//! Smoothing filters for display and for metrics that need smoothed input.
//!
//! Sample-based filters use a centered window: for a window of `w` samples,
//! position `i` covers `[i - (w - 1) / 2, i + w / 2]`. Near the boundaries the
//! window shrinks to the samples that exist, so there is no wrapping and no
//! zero padding. Output length always equals input length.

use serde::{Deserialize, Serialize};

use super::percentiles::{quantile_sorted, sorted_ascending};
use crate::error::{Result, StatsError};
use crate::session::Point;

/// Smoothing applied to a sequence before it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    None,
    /// Centered moving average over `moving_average_window_size` samples
    MovingAverage,
    /// Centered moving median over `moving_average_window_size` samples
    Median,
    /// Trailing average over a fixed wall-clock interval (point series only)
    TimeIntervalAverage,
}

fn window_bounds(index: usize, len: usize, window: usize) -> (usize, usize) {
    let start = index.saturating_sub((window - 1) / 2);
    let end = (index + window / 2 + 1).min(len);
    (start, end)
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(StatsError::InvalidWindow(
            "smoothing window must hold at least one sample".to_string(),
        ));
    }
    Ok(())
}

/// Centered moving average with shrinking boundary windows.
///
/// # Examples
///
/// ```
/// use frametime_stats::stats::filter::moving_average;
///
/// let smoothed = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
/// assert_eq!(smoothed, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
/// ```
pub fn moving_average(sequence: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(window)?;

    let mut prefix = Vec::with_capacity(sequence.len() + 1);
    prefix.push(0.0);
    for value in sequence {
        prefix.push(prefix[prefix.len() - 1] + value);
    }

    Ok((0..sequence.len())
        .map(|i| {
            let (start, end) = window_bounds(i, sequence.len(), window);
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect())
}

/// Centered moving median with the same boundary policy as [`moving_average`].
pub fn moving_median(sequence: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(window)?;

    Ok((0..sequence.len())
        .map(|i| {
            let (start, end) = window_bounds(i, sequence.len(), window);
            quantile_sorted(&sorted_ascending(&sequence[start..end]), 0.5)
        })
        .collect())
}

/// Apply the sample-based part of `mode` to `sequence`.
///
/// `TimeIntervalAverage` needs timestamps and is handled by
/// [`time_interval_average`]; here it leaves the sequence unchanged.
pub fn apply(sequence: &[f64], mode: FilterMode, window: usize) -> Result<Vec<f64>> {
    match mode {
        FilterMode::MovingAverage => moving_average(sequence, window),
        FilterMode::Median => moving_median(sequence, window),
        FilterMode::None | FilterMode::TimeIntervalAverage => Ok(sequence.to_vec()),
    }
}

/// Trailing time-based average of a point series.
///
/// Each output point keeps its x (time in seconds) and takes as y the mean of
/// all values whose time lies in `(x - interval_s, x]`. Points must be sorted
/// by time.
pub fn time_interval_average(points: &[Point], interval_s: f64) -> Result<Vec<Point>> {
    if !interval_s.is_finite() || interval_s <= 0.0 {
        return Err(StatsError::InvalidWindow(format!(
            "time interval must be positive, got {interval_s}"
        )));
    }

    let mut averaged = Vec::with_capacity(points.len());
    let mut start = 0;
    let mut sum = 0.0;
    for (end, point) in points.iter().enumerate() {
        sum += point.y;
        while points[start].x <= point.x - interval_s && start < end {
            sum -= points[start].y;
            start += 1;
        }
        averaged.push(Point::new(point.x, sum / (end - start + 1) as f64));
    }
    Ok(averaged)
}
