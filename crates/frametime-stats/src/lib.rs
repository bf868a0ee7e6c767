//! Frametime statistics and windowing engine
//!
//! This crate turns per-frame timing data from a game capture into the
//! figures a frame-pacing analysis needs: FPS metrics, low-percentage
//! summaries, stutter shares, variance and distribution data, and windowed
//! views of a session for charting.
//!
//! # Features
//!
//! - **Metrics**: a closed [`Metric`] set computed by [`MetricCalculator`] in FPS or frametime
//! - **Stutter analysis**: local-baseline stutter detection and low-FPS time shares
//! - **Outlier adjustment**: length-preserving replacement of capture glitches
//! - **Smoothing**: moving average, moving median and time-interval averaging
//! - **Time windows**: [`TimeWindowServer`] slices a bound [`CaptureSession`]
//! - **Reports**: JSON and console rendering of a [`report::SessionReport`]
//!
//! # Example
//!
//! ```
//! use frametime_stats::{metric_analysis, CaptureSession, Metric, MetricCalculator, StatisticsConfig, TimeWindowServer};
//!
//! # fn example() -> anyhow::Result<()> {
//! let start_times = vec![0.0, 0.016, 0.033, 0.050, 0.066];
//! let frametimes = vec![16.0, 17.0, 16.0, 16.5, 40.0];
//! let session = CaptureSession::new(start_times, frametimes)?;
//!
//! let calculator = MetricCalculator::new(StatisticsConfig::default());
//! let p1 = calculator.fps_metric(session.frametimes(), Metric::P1)?;
//! assert!(p1 < 60.0);
//!
//! let analysis = metric_analysis(&calculator, session.frametimes(), Metric::P1, Metric::None)?;
//! assert!(analysis.result_string.starts_with("Avg="));
//!
//! let mut server = TimeWindowServer::new(StatisticsConfig::default());
//! server.bind(session);
//! server.set_window(0.0, 0.04)?;
//! assert_eq!(server.frametime_window()?, Some(vec![16.0, 17.0, 16.0]));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Configuration
//!
//! Settings are passed explicitly through [`StatisticsConfig`], which can be
//! loaded from TOML:
//!
//! ```toml
//! fps_rounding_digits = 2
//! stuttering_factor = 2.5
//! remove_outlier_method = "InterquartileRange"
//! filter_mode = "MovingAverage"
//! ```

pub mod analysis;
pub mod config;
pub mod distribution;
pub mod error;
pub mod metrics;
pub mod report;
pub mod session;
pub mod stats;
pub mod window;

// Re-export main types for convenience
pub use analysis::{
    metric_analysis, metric_analysis_with_display_times, outlier_analysis, MetricAnalysisResult,
    RelatedMetric,
};
pub use config::StatisticsConfig;
pub use distribution::{discrete_distribution, time_weighted_distribution, DiscreteDistribution};
pub use error::{Result, StatsError};
pub use metrics::thresholds::fps_threshold_time_percentages;
pub use metrics::{fps_threshold_counts, fps_threshold_times, Metric, MetricCalculator, FPS_THRESHOLDS};
pub use report::{OutputFormat, Reporter, SessionReport};
pub use session::{CaptureSession, Channel, FrameSample, Point};
pub use stats::{adjust, FilterMode, PercentileSummary, RemoveOutlierMethod};
pub use window::{TimeWindow, TimeWindowServer};
