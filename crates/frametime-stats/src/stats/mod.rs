//! Statistical building blocks for frametime analysis
//!
//! This module provides order statistics, outlier adjustment and smoothing
//! filters. The metric calculator and the time-window server are built on top
//! of these.
//!
//! # Examples
//!
//! ```
//! use frametime_stats::stats::{adjust, moving_average, PercentileSummary, RemoveOutlierMethod};
//!
//! // A steady 60 FPS capture with one glitch from the capture tool
//! let frametimes = vec![16.6, 16.7, 16.6, 16.8, 180.0, 16.6, 16.7, 16.6];
//!
//! // Replace the glitch without changing the sequence length
//! let clean = adjust(&frametimes, RemoveOutlierMethod::InterquartileRange).unwrap();
//! assert_eq!(clean.len(), frametimes.len());
//!
//! // Smooth for display
//! let smoothed = moving_average(&clean, 3).unwrap();
//!
//! let summary = PercentileSummary::from_samples(&smoothed).unwrap();
//! assert!(summary.max < 20.0);
//! ```

pub mod filter;
pub mod outliers;
pub mod percentiles;

pub use filter::{moving_average, moving_median, time_interval_average, FilterMode};
pub use outliers::{adjust, detect_outliers, OutlierResult, RemoveOutlierMethod};
pub use percentiles::{median, percentile, quantile, PercentileSummary};
