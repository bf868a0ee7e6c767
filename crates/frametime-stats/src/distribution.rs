//! Histograms of frametime sequences.
//!
//! [`discrete_distribution`] picks its own bin width; [`time_weighted_distribution`]
//! uses a fixed width and weights each bin by the time spent in it rather than
//! by frame count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{validate_frametimes, validate_sequence, Result, StatsError};
use crate::metrics::calculator::round_to;
use crate::session::Point;

/// Bin counts tried when optimising the bin width.
const MIN_BINS: usize = 4;
const MAX_BINS: usize = 15;

/// Default bin width of [`time_weighted_distribution`] in ms.
pub const DEFAULT_TIME_INCREMENT_MS: f64 = 0.05;

/// Samples grouped into equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteDistribution {
    /// `bins.len() + 1` ascending edges
    pub bin_edges: Vec<f64>,
    /// Samples of each bin, in input order
    pub bins: Vec<Vec<f64>>,
}

impl DiscreteDistribution {
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(Vec::len).collect()
    }

    /// Total number of samples over all bins.
    pub fn total(&self) -> usize {
        self.bins.iter().map(Vec::len).sum()
    }

    /// Share of samples per bin in percent.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total() as f64;
        self.bins
            .iter()
            .map(|bin| 100.0 * bin.len() as f64 / total)
            .collect()
    }

    /// Bin centers paired with their sample counts.
    pub fn points(&self) -> Vec<Point> {
        self.bin_edges
            .windows(2)
            .zip(&self.bins)
            .map(|(edges, bin)| Point::new((edges[0] + edges[1]) / 2.0, bin.len() as f64))
            .collect()
    }
}

fn linear_space(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect()
}

// Bins are [lower, upper) except the last one, which is closed.
fn bin_index(value: f64, min: f64, width: f64, bins: usize) -> usize {
    (((value - min) / width).floor() as usize).min(bins - 1)
}

fn histogram(sequence: &[f64], min: f64, width: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    for &value in sequence {
        counts[bin_index(value, min, width, bins)] += 1;
    }
    counts
}

/// Shimazaki-Shinomoto cost `(2k - v) / width²` of one bin count.
///
/// `k` and `v` are the mean and variance of the inner bin counts; the two
/// edge bins are left out of the score. The variance is divided by the full
/// bin count.
fn bin_cost(sequence: &[f64], min: f64, max: f64, bins: usize) -> f64 {
    let width = (max - min) / bins as f64;
    let counts = histogram(sequence, min, width, bins);
    let inner = &counts[1..bins - 1];

    let mean = inner.iter().sum::<usize>() as f64 / inner.len() as f64;
    let variance = inner
        .iter()
        .map(|&count| (count as f64 - mean).powi(2))
        .sum::<f64>()
        / bins as f64;

    (2.0 * mean - variance) / width.powi(2)
}

/// Histogram with a data-driven bin count between 4 and 15.
///
/// A sequence with zero range yields one bin holding every sample.
pub fn discrete_distribution(sequence: &[f64]) -> Result<DiscreteDistribution> {
    validate_sequence(sequence)?;

    let min = sequence.iter().copied().fold(f64::MAX, f64::min);
    let max = sequence.iter().copied().fold(f64::MIN, f64::max);

    if max == min {
        return Ok(DiscreteDistribution {
            bin_edges: vec![min, max],
            bins: vec![sequence.to_vec()],
        });
    }

    // First minimum wins on ties, preferring fewer bins.
    let mut best_bins = MIN_BINS;
    let mut best_cost = f64::INFINITY;
    for bins in MIN_BINS..=MAX_BINS {
        let cost = bin_cost(sequence, min, max, bins);
        if cost < best_cost {
            best_cost = cost;
            best_bins = bins;
        }
    }
    debug!(bins = best_bins, cost = best_cost, "selected histogram bin count");

    let width = (max - min) / best_bins as f64;
    let mut bins = vec![Vec::new(); best_bins];
    for &value in sequence {
        bins[bin_index(value, min, width, best_bins)].push(value);
    }

    Ok(DiscreteDistribution {
        bin_edges: linear_space(min, max, best_bins),
        bins,
    })
}

/// Share of capture time per fixed-width frametime bin.
///
/// Each point is `(bin upper edge in ms, percent of total time)`; empty bins
/// are skipped and the points ascend in `x`.
pub fn time_weighted_distribution(frametimes: &[f64], increment_ms: f64) -> Result<Vec<Point>> {
    validate_frametimes(frametimes)?;
    if !increment_ms.is_finite() || increment_ms <= 0.0 {
        return Err(StatsError::InvalidWindow(format!(
            "distribution increment must be positive, got {increment_ms}"
        )));
    }

    let mut time_per_bin: BTreeMap<u64, f64> = BTreeMap::new();
    for &frametime in frametimes {
        let bin = (frametime / increment_ms).floor() as u64;
        *time_per_bin.entry(bin).or_insert(0.0) += frametime;
    }

    let total: f64 = frametimes.iter().sum();
    Ok(time_per_bin
        .into_iter()
        .map(|(bin, time)| {
            let upper_edge = round_to((bin + 1) as f64 * increment_ms, 10);
            Point::new(upper_edge, 100.0 * time / total)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sum_to_length() {
        let sequence: Vec<f64> = (0..500).map(|i| 10.0 + ((i * 37) % 101) as f64 * 0.1).collect();
        let distribution = discrete_distribution(&sequence).unwrap();

        assert_eq!(distribution.total(), sequence.len());
        assert!(distribution.bin_count() >= MIN_BINS);
        assert!(distribution.bin_count() <= MAX_BINS);
        assert_eq!(distribution.bin_edges.len(), distribution.bin_count() + 1);
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let sequence = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let distribution = discrete_distribution(&sequence).unwrap();
        let last = distribution.bins.last().unwrap();
        assert!(last.contains(&5.0));
        assert_eq!(*distribution.bin_edges.last().unwrap(), 5.0);
    }

    #[test]
    fn test_bin_cost_ignores_edge_bins() {
        // counts [1, 1, 1, 2]; only the inner [1, 1] are scored
        let sequence = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(bin_cost(&sequence, 0.0, 4.0, 4), 2.0);
    }

    #[test]
    fn test_zero_range_single_bin() {
        let distribution = discrete_distribution(&[16.6; 4]).unwrap();
        assert_eq!(distribution.counts(), vec![4]);
        assert_eq!(distribution.percentages(), vec![100.0]);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(discrete_distribution(&[]), Err(StatsError::EmptySequence));
    }

    #[test]
    fn test_time_weighted_distribution() {
        let frametimes = vec![10.01, 10.02, 20.0];
        let points = time_weighted_distribution(&frametimes, 1.0).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].x, 11.0);
        assert_eq!(points[1].x, 21.0);
        assert!((points[0].y + points[1].y - 100.0).abs() < 1e-9);
        assert!((points[1].y - 100.0 * 20.0 / 40.03).abs() < 1e-9);
    }

    #[test]
    fn test_time_weighted_rejects_zero_increment() {
        assert!(matches!(
            time_weighted_distribution(&[10.0], 0.0),
            Err(StatsError::InvalidWindow(_))
        ));
    }
}
