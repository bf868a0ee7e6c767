//! Session reports
//!
//! A [`SessionReport`] collects the headline figures of one capture session
//! (metric analysis, FPS metrics, frametime percentiles, stutter shares and the
//! FPS threshold ladder) into one serializable value. [`Reporter`] renders it
//! as JSON or as a console table. Rendering returns a `String`; where it goes
//! is up to the caller.
//!
//! # Example
//!
//! ```
//! use frametime_stats::report::{OutputFormat, Reporter, SessionReport};
//! use frametime_stats::{CaptureSession, Metric, MetricCalculator};
//!
//! # fn example() -> anyhow::Result<()> {
//! let session = CaptureSession::new(vec![0.0, 0.01, 0.02], vec![10.0, 10.0, 12.0])?;
//! let calculator = MetricCalculator::default();
//! let report = SessionReport::build("Benchmark run", &calculator, &session, Metric::P1, Metric::P0dot2)?;
//!
//! let json = Reporter::new(OutputFormat::Json).format_report(&report)?;
//! assert!(json.contains("Benchmark run"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod console;
mod json;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::analysis::{metric_analysis, MetricAnalysisResult};
use crate::error::Result;
use crate::metrics::thresholds::{fps_threshold_counts, fps_threshold_time_percentages, threshold_ladder};
use crate::metrics::{Metric, MetricCalculator};
use crate::session::CaptureSession;
use crate::stats::{adjust, PercentileSummary};

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// FPS metrics listed in every report, in display order.
pub const REPORT_METRICS: [Metric; 16] = [
    Metric::Max,
    Metric::P99,
    Metric::P95,
    Metric::Average,
    Metric::Median,
    Metric::P5,
    Metric::P1,
    Metric::P0dot2,
    Metric::P0dot1,
    Metric::OnePercentLowAverage,
    Metric::ZerodotTwoPercentLowAverage,
    Metric::ZerodotOnePercentLowAverage,
    Metric::OnePercentLowIntegral,
    Metric::ZerodotOnePercentLowIntegral,
    Metric::Min,
    Metric::AdaptiveStd,
];

/// One named FPS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub metric: Metric,
    pub fps: f64,
}

/// Frames and time below one rung of the FPS ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdShare {
    pub threshold_fps: f64,
    pub frames: usize,
    pub time_percentage: f64,
}

/// Headline figures of one capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub name: String,
    pub frame_count: usize,
    pub duration_s: f64,
    pub analysis: MetricAnalysisResult,
    pub fps_metrics: Vec<MetricValue>,
    pub frametime_summary: PercentileSummary,
    pub stuttering_count_percentage: f64,
    pub stuttering_time_percentage: f64,
    pub low_fps_time_percentage: f64,
    pub thresholds: Vec<ThresholdShare>,
}

impl SessionReport {
    /// Compute every figure of the report from the session's frametimes.
    ///
    /// The frametimes go through the configured outlier adjustment once; every
    /// figure is computed from the adjusted sequence. Stutter and low-FPS
    /// shares use the calculator's configured factor and threshold.
    #[instrument(skip(calculator, session), fields(samples = session.len()))]
    pub fn build(
        name: &str,
        calculator: &MetricCalculator,
        session: &CaptureSession,
        second_metric: Metric,
        third_metric: Metric,
    ) -> Result<Self> {
        let config = calculator.config();
        let adjusted = adjust(session.frametimes(), config.remove_outlier_method)?;
        let frametimes = adjusted.as_slice();

        let fps_metrics = REPORT_METRICS
            .iter()
            .map(|&metric| {
                calculator
                    .fps_metric(frametimes, metric)
                    .map(|fps| MetricValue { metric, fps })
            })
            .collect::<Result<Vec<_>>>()?;

        let counts = fps_threshold_counts(frametimes, false)?;
        let time_percentages = fps_threshold_time_percentages(frametimes, false)?;
        let thresholds = threshold_ladder(false)
            .into_iter()
            .zip(counts)
            .zip(time_percentages)
            .map(|((threshold_fps, frames), time_percentage)| ThresholdShare {
                threshold_fps,
                frames,
                time_percentage,
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            frame_count: session.len(),
            duration_s: session.duration_s(),
            analysis: metric_analysis(calculator, frametimes, second_metric, third_metric)?,
            fps_metrics,
            frametime_summary: calculator.percentile_summary(frametimes)?,
            stuttering_count_percentage: calculator
                .stuttering_count_percentage(frametimes, config.stuttering_factor)?,
            stuttering_time_percentage: calculator
                .stuttering_time_percentage(frametimes, config.stuttering_factor)?,
            low_fps_time_percentage: calculator.low_fps_time_percentage(
                frametimes,
                config.stuttering_factor,
                config.low_fps_threshold,
            )?,
            thresholds,
        })
    }

    /// FPS value of `metric`, if the report lists it.
    pub fn fps(&self, metric: Metric) -> Option<f64> {
        self.fps_metrics
            .iter()
            .find(|value| value.metric == metric)
            .map(|value| value.fps)
    }
}

/// Output format for session reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Plain-text table
    #[default]
    Console,
}

/// Renders session reports in one [`OutputFormat`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one report as a string
    pub fn format_report(&self, report: &SessionReport) -> anyhow::Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StatisticsConfig;
    use crate::stats::RemoveOutlierMethod;

    pub(crate) fn create_test_report() -> SessionReport {
        let start_times: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        let mut frametimes = vec![10.0; 100];
        frametimes[50] = 40.0;
        let session = CaptureSession::new(start_times, frametimes).unwrap();
        SessionReport::build(
            "Test Session",
            &MetricCalculator::default(),
            &session,
            Metric::P1,
            Metric::None,
        )
        .unwrap()
    }

    #[test]
    fn test_build_report() {
        let report = create_test_report();
        assert_eq!(report.frame_count, 100);
        assert_eq!(report.fps_metrics.len(), REPORT_METRICS.len());
        assert_eq!(report.fps(Metric::Max), Some(100.0));
        assert_eq!(report.fps(Metric::Min), Some(25.0));
        assert_eq!(report.fps(Metric::CpuFpsPerWatt), None);
        assert_eq!(report.stuttering_count_percentage, 1.0);
        assert_eq!(report.thresholds.len(), 10);
        assert_eq!(report.thresholds[0].frames, 100);
        assert!(report.analysis.result_string.starts_with("Avg="));
    }

    #[test]
    fn test_reporter_json_format() {
        let report = create_test_report();
        let output = Reporter::new(OutputFormat::Json)
            .format_report(&report)
            .unwrap();
        assert!(output.contains("Test Session"));
        assert!(output.contains("OnePercentLowIntegral"));
    }

    #[test]
    fn test_reporter_console_format() {
        let report = create_test_report();
        let output = Reporter::new(OutputFormat::Console)
            .format_report(&report)
            .unwrap();
        assert!(output.contains("Test Session"));
        assert!(output.contains("1% Low Avg"));
    }

    #[test]
    fn test_report_applies_configured_outlier_removal() {
        let start_times: Vec<f64> = (0..200).map(|i| i as f64 * 0.01).collect();
        let mut frametimes = vec![10.0; 200];
        frametimes[100] = 1000.0;
        let session = CaptureSession::new(start_times, frametimes).unwrap();

        let raw = SessionReport::build(
            "Raw",
            &MetricCalculator::default(),
            &session,
            Metric::P1,
            Metric::None,
        )
        .unwrap();
        assert_eq!(raw.fps(Metric::Min), Some(1.0));

        let calculator = MetricCalculator::new(StatisticsConfig {
            remove_outlier_method: RemoveOutlierMethod::InterquartileRange,
            ..StatisticsConfig::default()
        });
        let report =
            SessionReport::build("Adjusted", &calculator, &session, Metric::P1, Metric::None)
                .unwrap();
        assert_eq!(report.frame_count, 200);
        assert_eq!(report.fps(Metric::Min), Some(100.0));
        assert_eq!(report.fps(Metric::Average), Some(100.0));
        assert_eq!(report.stuttering_count_percentage, 0.0);
        assert_eq!(report.thresholds[5].frames, 0);
    }

    #[test]
    fn test_default_format() {
        assert_eq!(Reporter::default().format(), OutputFormat::Console);
    }

    #[test]
    fn test_empty_session_report() {
        let session = CaptureSession::new(vec![], vec![]).unwrap();
        let result = SessionReport::build(
            "Empty",
            &MetricCalculator::default(),
            &session,
            Metric::P1,
            Metric::None,
        );
        assert_eq!(result, Err(crate::error::StatsError::EmptySequence));
    }
}
