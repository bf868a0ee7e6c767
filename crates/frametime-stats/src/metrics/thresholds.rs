//! Frames and time spent on either side of a fixed FPS ladder.

use crate::error::{validate_frametimes, Result};

/// FPS ladder, fastest first.
pub const FPS_THRESHOLDS: [f64; 10] = [240.0, 144.0, 120.0, 90.0, 75.0, 60.0, 45.0, 30.0, 15.0, 10.0];

/// The ladder in the order results are reported: descending normally,
/// ascending when `reversed`.
pub fn threshold_ladder(reversed: bool) -> Vec<f64> {
    let mut ladder = FPS_THRESHOLDS.to_vec();
    if reversed {
        ladder.reverse();
    }
    ladder
}

// Normal: the frame renders slower than `threshold` FPS. Reversed: faster.
fn selected(frametime_ms: f64, threshold: f64, reversed: bool) -> bool {
    let limit_ms = 1000.0 / threshold;
    if reversed {
        frametime_ms < limit_ms
    } else {
        frametime_ms > limit_ms
    }
}

/// Number of frames below each ladder threshold (above, if `reversed`).
pub fn fps_threshold_counts(frametimes: &[f64], reversed: bool) -> Result<Vec<usize>> {
    validate_frametimes(frametimes)?;
    Ok(threshold_ladder(reversed)
        .into_iter()
        .map(|threshold| {
            frametimes
                .iter()
                .filter(|&&ft| selected(ft, threshold, reversed))
                .count()
        })
        .collect())
}

/// Milliseconds spent below each ladder threshold (above, if `reversed`).
pub fn fps_threshold_times(frametimes: &[f64], reversed: bool) -> Result<Vec<f64>> {
    validate_frametimes(frametimes)?;
    Ok(threshold_ladder(reversed)
        .into_iter()
        .map(|threshold| {
            frametimes
                .iter()
                .filter(|&&ft| selected(ft, threshold, reversed))
                .sum::<f64>()
        })
        .collect())
}

/// [`fps_threshold_times`] as a percentage of the capture duration.
pub fn fps_threshold_time_percentages(frametimes: &[f64], reversed: bool) -> Result<Vec<f64>> {
    let times = fps_threshold_times(frametimes, reversed)?;
    let total: f64 = frametimes.iter().sum();
    Ok(times.into_iter().map(|time| 100.0 * time / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;

    #[test]
    fn test_ladder_order() {
        assert_eq!(threshold_ladder(false)[0], 240.0);
        assert_eq!(threshold_ladder(true)[0], 10.0);
        assert_eq!(threshold_ladder(true).len(), FPS_THRESHOLDS.len());
    }

    #[test]
    fn test_counts_below_thresholds() {
        // 100 FPS, 50 FPS, 20 FPS
        let frametimes = vec![10.0, 20.0, 50.0];
        let counts = fps_threshold_counts(&frametimes, false).unwrap();
        //          240 144 120 90 75 60 45 30 15 10
        assert_eq!(counts, vec![3, 3, 3, 2, 2, 2, 1, 1, 0, 0]);
    }

    #[test]
    fn test_counts_above_thresholds() {
        let frametimes = vec![10.0, 20.0, 50.0];
        let counts = fps_threshold_counts(&frametimes, true).unwrap();
        //          10 15 30 45 60 75 90 120 144 240
        assert_eq!(counts, vec![3, 3, 2, 2, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_exact_threshold_is_not_counted() {
        // 60 FPS exactly is neither below nor above 60
        let frametimes = vec![1000.0 / 60.0];
        assert_eq!(fps_threshold_counts(&frametimes, false).unwrap()[5], 0);
        assert_eq!(fps_threshold_counts(&frametimes, true).unwrap()[4], 0);
    }

    #[test]
    fn test_times_and_percentages() {
        let frametimes = vec![10.0, 20.0, 50.0, 20.0];
        let times = fps_threshold_times(&frametimes, false).unwrap();
        assert_eq!(times[0], 100.0);
        assert_eq!(times[5], 90.0);
        assert_eq!(times[7], 50.0);
        assert_eq!(times[9], 0.0);

        let shares = fps_threshold_time_percentages(&frametimes, false).unwrap();
        assert_eq!(shares[0], 100.0);
        assert_eq!(shares[7], 50.0);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(fps_threshold_counts(&[], false), Err(StatsError::EmptySequence));
        assert_eq!(fps_threshold_times(&[], true), Err(StatsError::EmptySequence));
    }
}
