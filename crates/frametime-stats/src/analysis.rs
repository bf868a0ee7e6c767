//! One-line metric summaries and cross-run anomaly flags.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::{Metric, MetricCalculator};
use crate::stats::percentiles::{quantile_sorted, sorted_ascending};

/// Average FPS plus up to two secondary FPS metrics of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAnalysisResult {
    /// e.g. `"Avg=59.99 FPS | P1=41.20 FPS | P0.2=33.10 FPS"`
    pub result_string: String,
    pub average: f64,
    /// `None` when the second metric was [`Metric::None`]
    pub second: Option<f64>,
    pub third: Option<f64>,
}

/// Which value of a [`MetricAnalysisResult`] the cross-run comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelatedMetric {
    Average,
    Second,
    Third,
}

impl MetricAnalysisResult {
    pub fn related(&self, related: RelatedMetric) -> Option<f64> {
        match related {
            RelatedMetric::Average => Some(self.average),
            RelatedMetric::Second => self.second,
            RelatedMetric::Third => self.third,
        }
    }
}

fn secondary(calculator: &MetricCalculator, source: &[f64], metric: Metric) -> Result<Option<f64>> {
    match metric {
        Metric::None => Ok(None),
        metric => calculator.fps_metric(source, metric).map(Some),
    }
}

fn build(
    calculator: &MetricCalculator,
    frametimes: &[f64],
    secondary_source: &[f64],
    second_metric: Metric,
    third_metric: Metric,
) -> Result<MetricAnalysisResult> {
    let average = calculator.fps_metric(frametimes, Metric::Average)?;
    let second = secondary(calculator, secondary_source, second_metric)?;
    let third = secondary(calculator, secondary_source, third_metric)?;

    let digits = calculator.config().fps_rounding_digits as usize;
    let mut parts = vec![format!("Avg={average:.digits$} FPS")];
    for (metric, value) in [(second_metric, second), (third_metric, third)] {
        if let Some(value) = value {
            parts.push(format!("{}={value:.digits$} FPS", metric.short_description()));
        }
    }

    Ok(MetricAnalysisResult {
        result_string: parts.join(" | "),
        average,
        second,
        third,
    })
}

/// Summarise a run as average FPS plus two secondary FPS metrics.
///
/// ```
/// use frametime_stats::{metric_analysis, Metric, MetricCalculator};
///
/// let calculator = MetricCalculator::default();
/// let analysis = metric_analysis(&calculator, &[10.0, 10.0, 20.0, 10.0], Metric::Min, Metric::None).unwrap();
/// assert_eq!(analysis.result_string, "Avg=80.00 FPS | Min=50.00 FPS");
/// assert_eq!(analysis.third, None);
/// ```
pub fn metric_analysis(
    calculator: &MetricCalculator,
    frametimes: &[f64],
    second_metric: Metric,
    third_metric: Metric,
) -> Result<MetricAnalysisResult> {
    build(calculator, frametimes, frametimes, second_metric, third_metric)
}

/// Like [`metric_analysis`], but the secondary metrics are computed from the
/// display-change intervals, which is what the viewer actually saw.
///
/// Zero intervals belong to frames that never reached the display and are
/// skipped. If no interval is left, the result is [`StatsError::EmptySequence`]
/// whenever a secondary metric is requested.
///
/// [`StatsError::EmptySequence`]: crate::error::StatsError::EmptySequence
pub fn metric_analysis_with_display_times(
    calculator: &MetricCalculator,
    frametimes: &[f64],
    display_times: &[f64],
    second_metric: Metric,
    third_metric: Metric,
) -> Result<MetricAnalysisResult> {
    let displayed: Vec<f64> = display_times.iter().copied().filter(|&t| t > 0.0).collect();
    build(calculator, frametimes, &displayed, second_metric, third_metric)
}

/// Flag runs whose related value deviates from the median of all runs by
/// more than `outlier_percentage` percent.
///
/// Runs without the related value are never flagged and do not count toward
/// the median. A zero median flags nothing.
pub fn outlier_analysis(
    results: &[MetricAnalysisResult],
    related: RelatedMetric,
    outlier_percentage: f64,
) -> Vec<bool> {
    let values: Vec<Option<f64>> = results.iter().map(|result| result.related(related)).collect();
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return vec![false; results.len()];
    }

    let median = quantile_sorted(&sorted_ascending(&present), 0.5);
    if median == 0.0 {
        return vec![false; results.len()];
    }

    values
        .into_iter()
        .map(|value| {
            value.is_some_and(|v| 100.0 * (v - median).abs() / median.abs() > outlier_percentage)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatisticsConfig;
    use crate::error::StatsError;

    fn analysis(average: f64, second: Option<f64>) -> MetricAnalysisResult {
        MetricAnalysisResult {
            result_string: String::new(),
            average,
            second,
            third: None,
        }
    }

    #[test]
    fn test_result_string_with_all_metrics() {
        let calculator = MetricCalculator::default();
        let frametimes = vec![10.0, 10.0, 10.0, 10.0];
        let result = metric_analysis(&calculator, &frametimes, Metric::P1, Metric::P0dot2).unwrap();
        assert_eq!(
            result.result_string,
            "Avg=100.00 FPS | P1=100.00 FPS | P0.2=100.00 FPS"
        );
        assert_eq!(result.second, Some(100.0));
        assert_eq!(result.third, Some(100.0));
    }

    #[test]
    fn test_result_string_omits_none() {
        let calculator = MetricCalculator::default();
        let result = metric_analysis(&calculator, &[20.0], Metric::None, Metric::None).unwrap();
        assert_eq!(result.result_string, "Avg=50.00 FPS");
        assert_eq!(result.second, None);
    }

    #[test]
    fn test_result_string_respects_rounding_digits() {
        let calculator = MetricCalculator::new(StatisticsConfig {
            fps_rounding_digits: 0,
            ..StatisticsConfig::default()
        });
        let result = metric_analysis(&calculator, &[16.67; 3], Metric::None, Metric::Max).unwrap();
        assert_eq!(result.result_string, "Avg=60 FPS | Max=60 FPS");
    }

    #[test]
    fn test_display_times_drive_secondary_metrics() {
        let calculator = MetricCalculator::default();
        let frametimes = vec![10.0; 4];
        let display_times = vec![20.0; 4];
        let result = metric_analysis_with_display_times(
            &calculator,
            &frametimes,
            &display_times,
            Metric::Min,
            Metric::None,
        )
        .unwrap();
        assert_eq!(result.average, 100.0);
        assert_eq!(result.second, Some(50.0));
    }

    #[test]
    fn test_display_times_skip_dropped_frames() {
        let calculator = MetricCalculator::default();
        let frametimes = vec![10.0; 3];
        let display_times = vec![10.0, 0.0, 20.0];
        let result = metric_analysis_with_display_times(
            &calculator,
            &frametimes,
            &display_times,
            Metric::Min,
            Metric::Max,
        )
        .unwrap();
        assert_eq!(result.second, Some(50.0));
        assert_eq!(result.third, Some(100.0));

        assert_eq!(
            metric_analysis_with_display_times(
                &calculator,
                &frametimes,
                &[0.0; 3],
                Metric::Min,
                Metric::None
            ),
            Err(StatsError::EmptySequence)
        );
    }

    #[test]
    fn test_empty_frametimes() {
        let calculator = MetricCalculator::default();
        assert_eq!(
            metric_analysis(&calculator, &[], Metric::P1, Metric::None),
            Err(StatsError::EmptySequence)
        );
    }

    #[test]
    fn test_outlier_analysis_flags_deviating_run() {
        let results = vec![
            analysis(100.0, Some(50.0)),
            analysis(101.0, Some(50.0)),
            analysis(99.0, Some(50.0)),
            analysis(120.0, Some(50.0)),
        ];
        assert_eq!(
            outlier_analysis(&results, RelatedMetric::Average, 3.0),
            vec![false, false, false, true]
        );
        assert_eq!(
            outlier_analysis(&results, RelatedMetric::Second, 3.0),
            vec![false; 4]
        );
    }

    #[test]
    fn test_outlier_analysis_missing_values() {
        let results = vec![analysis(100.0, None), analysis(100.0, None)];
        assert_eq!(
            outlier_analysis(&results, RelatedMetric::Third, 3.0),
            vec![false, false]
        );
        assert!(outlier_analysis(&[], RelatedMetric::Average, 3.0).is_empty());
    }
}
