//! Configuration for metric computation and windowing
//!
//! Every computation receives its settings through an explicit
//! [`StatisticsConfig`] value instead of reading global state, so results are
//! reproducible from their inputs alone. The configuration can be built in
//! code or loaded from TOML:
//!
//! ```toml
//! fps_rounding_digits = 2
//! moving_average_window_size = 10
//! stuttering_factor = 2.5
//! low_fps_threshold = 25.0
//! interval_average_window_s = 0.5
//! outlier_percentage = 3.0
//! remove_outlier_method = "InterquartileRange"
//! filter_mode = "MovingAverage"
//! ```

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::stats::{FilterMode, RemoveOutlierMethod};

/// Settings shared by the metric calculator and the time-window server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Decimal places FPS values are rounded to (default: 2)
    #[serde(default = "default_fps_rounding_digits")]
    pub fps_rounding_digits: u32,
    /// Sample count of the display smoothing window (default: 10)
    #[serde(default = "default_moving_average_window_size")]
    pub moving_average_window_size: usize,
    /// A frame is a stutter when it exceeds this multiple of its baseline (default: 2.5)
    #[serde(default = "default_stuttering_factor")]
    pub stuttering_factor: f64,
    /// FPS floor for the low-FPS time share (default: 25)
    #[serde(default = "default_low_fps_threshold")]
    pub low_fps_threshold: f64,
    /// Wall-clock window in seconds for adaptive STDEV and time-interval smoothing (default: 0.5)
    #[serde(default = "default_interval_average_window_s")]
    pub interval_average_window_s: f64,
    /// Relative deviation from the batch median that marks a run as anomalous (default: 3%)
    #[serde(default = "default_outlier_percentage")]
    pub outlier_percentage: f64,
    /// Outlier policy applied by the time-window server
    #[serde(default)]
    pub remove_outlier_method: RemoveOutlierMethod,
    /// Smoothing applied to windowed point series
    #[serde(default)]
    pub filter_mode: FilterMode,
}

fn default_fps_rounding_digits() -> u32 {
    2
}

fn default_moving_average_window_size() -> usize {
    10
}

fn default_stuttering_factor() -> f64 {
    2.5
}

fn default_low_fps_threshold() -> f64 {
    25.0
}

fn default_interval_average_window_s() -> f64 {
    0.5
}

fn default_outlier_percentage() -> f64 {
    3.0
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            fps_rounding_digits: default_fps_rounding_digits(),
            moving_average_window_size: default_moving_average_window_size(),
            stuttering_factor: default_stuttering_factor(),
            low_fps_threshold: default_low_fps_threshold(),
            interval_average_window_s: default_interval_average_window_s(),
            outlier_percentage: default_outlier_percentage(),
            remove_outlier_method: RemoveOutlierMethod::default(),
            filter_mode: FilterMode::default(),
        }
    }
}

impl StatisticsConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - A value fails [`validate`](Self::validate)
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use frametime_stats::config::StatisticsConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = StatisticsConfig::from_str("stuttering_factor = 3.0")?;
    /// assert_eq!(config.stuttering_factor, 3.0);
    /// assert_eq!(config.fps_rounding_digits, 2);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that windows, factors and thresholds are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.moving_average_window_size >= 1,
            "moving_average_window_size must be at least 1"
        );
        ensure!(
            self.stuttering_factor.is_finite() && self.stuttering_factor > 0.0,
            "stuttering_factor must be positive, got {}",
            self.stuttering_factor
        );
        ensure!(
            self.low_fps_threshold.is_finite() && self.low_fps_threshold > 0.0,
            "low_fps_threshold must be positive, got {}",
            self.low_fps_threshold
        );
        ensure!(
            self.interval_average_window_s.is_finite() && self.interval_average_window_s > 0.0,
            "interval_average_window_s must be positive, got {}",
            self.interval_average_window_s
        );
        ensure!(
            self.outlier_percentage.is_finite() && self.outlier_percentage >= 0.0,
            "outlier_percentage must not be negative, got {}",
            self.outlier_percentage
        );
        ensure!(
            self.fps_rounding_digits <= 10,
            "fps_rounding_digits must be at most 10, got {}",
            self.fps_rounding_digits
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = StatisticsConfig::from_str("").unwrap();
        assert_eq!(config, StatisticsConfig::default());
        assert_eq!(config.fps_rounding_digits, 2);
        assert_eq!(config.moving_average_window_size, 10);
        assert_eq!(config.stuttering_factor, 2.5);
        assert_eq!(config.low_fps_threshold, 25.0);
        assert_eq!(config.remove_outlier_method, RemoveOutlierMethod::None);
        assert_eq!(config.filter_mode, FilterMode::None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            fps_rounding_digits = 1
            moving_average_window_size = 20
            stuttering_factor = 3.0
            low_fps_threshold = 30.0
            interval_average_window_s = 1.0
            outlier_percentage = 5.0
            remove_outlier_method = "MedianAbsoluteDeviation"
            filter_mode = "Median"
        "#;

        let config = StatisticsConfig::from_str(toml).unwrap();
        assert_eq!(config.fps_rounding_digits, 1);
        assert_eq!(config.moving_average_window_size, 20);
        assert_eq!(config.stuttering_factor, 3.0);
        assert_eq!(config.low_fps_threshold, 30.0);
        assert_eq!(config.interval_average_window_s, 1.0);
        assert_eq!(config.outlier_percentage, 5.0);
        assert_eq!(
            config.remove_outlier_method,
            RemoveOutlierMethod::MedianAbsoluteDeviation
        );
        assert_eq!(config.filter_mode, FilterMode::Median);
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = StatisticsConfig::from_str("moving_average_window_size = 0").unwrap_err();
        assert!(err.to_string().contains("moving_average_window_size"));
    }

    #[test]
    fn test_rejects_negative_stuttering_factor() {
        assert!(StatisticsConfig::from_str("stuttering_factor = -1.0").is_err());
    }

    #[test]
    fn test_rejects_unknown_outlier_method() {
        assert!(StatisticsConfig::from_str(r#"remove_outlier_method = "FiveSigma""#).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fps_rounding_digits = 0").unwrap();

        let config = StatisticsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.fps_rounding_digits, 0);
    }

    #[test]
    fn test_from_missing_file() {
        let err = StatisticsConfig::from_file("/nonexistent/stats.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
