//! Named frame-pacing metrics and their computation.
//!
//! - [`Metric`]: the closed set of named statistics
//! - [`calculator::MetricCalculator`]: maps each metric to its computation rule
//! - [`thresholds`]: frames and time spent above or below an FPS ladder
//!
//! # Example
//!
//! ```
//! use frametime_stats::{Metric, MetricCalculator, StatisticsConfig};
//!
//! let calculator = MetricCalculator::new(StatisticsConfig::default());
//! let frametimes = vec![16.0, 16.0, 17.0, 16.0, 40.0];
//! let average = calculator.fps_metric(&frametimes, Metric::Average).unwrap();
//! assert_eq!(average, 47.62);
//! ```

pub mod calculator;
pub mod thresholds;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use calculator::MetricCalculator;
pub use thresholds::{fps_threshold_counts, fps_threshold_times, FPS_THRESHOLDS};

/// Every statistic the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Max,
    P99,
    P95,
    Average,
    Median,
    P5,
    P1,
    P0dot2,
    P0dot1,
    OnePercentLowAverage,
    ZerodotTwoPercentLowAverage,
    ZerodotOnePercentLowAverage,
    OnePercentLowIntegral,
    ZerodotTwoPercentLowIntegral,
    ZerodotOnePercentLowIntegral,
    Min,
    AdaptiveStd,
    CpuFpsPerWatt,
    GpuFpsPerWatt,
    GpuActiveAverage,
    GpuActiveP1,
    GpuActiveOnePercentLowAverage,
    CpuActiveAverage,
    None,
}

impl Metric {
    pub const ALL: [Metric; 24] = [
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
        Metric::ZerodotTwoPercentLowIntegral,
        Metric::ZerodotOnePercentLowIntegral,
        Metric::Min,
        Metric::AdaptiveStd,
        Metric::CpuFpsPerWatt,
        Metric::GpuFpsPerWatt,
        Metric::GpuActiveAverage,
        Metric::GpuActiveP1,
        Metric::GpuActiveOnePercentLowAverage,
        Metric::CpuActiveAverage,
        Metric::None,
    ];

    /// Human-readable name.
    pub fn description(&self) -> &'static str {
        match self {
            Metric::Max => "Maximum",
            Metric::P99 => "99% percentile",
            Metric::P95 => "95% percentile",
            Metric::Average => "Average",
            Metric::Median => "Median",
            Metric::P5 => "5% percentile",
            Metric::P1 => "1% percentile",
            Metric::P0dot2 => "0.2% percentile",
            Metric::P0dot1 => "0.1% percentile",
            Metric::OnePercentLowAverage => "1% low average",
            Metric::ZerodotTwoPercentLowAverage => "0.2% low average",
            Metric::ZerodotOnePercentLowAverage => "0.1% low average",
            Metric::OnePercentLowIntegral => "1% low integral",
            Metric::ZerodotTwoPercentLowIntegral => "0.2% low integral",
            Metric::ZerodotOnePercentLowIntegral => "0.1% low integral",
            Metric::Min => "Minimum",
            Metric::AdaptiveStd => "Adaptive STDEV",
            Metric::CpuFpsPerWatt => "CPU FPS per 10 Watts",
            Metric::GpuFpsPerWatt => "GPU FPS per 10 Watts",
            Metric::GpuActiveAverage => "GPU active average",
            Metric::GpuActiveP1 => "GPU active 1% percentile",
            Metric::GpuActiveOnePercentLowAverage => "GPU active 1% low average",
            Metric::CpuActiveAverage => "CPU active average",
            Metric::None => "None",
        }
    }

    /// Compact label used in analysis strings.
    pub fn short_description(&self) -> &'static str {
        match self {
            Metric::Max => "Max",
            Metric::P99 => "P99",
            Metric::P95 => "P95",
            Metric::Average => "Avg",
            Metric::Median => "Med",
            Metric::P5 => "P5",
            Metric::P1 => "P1",
            Metric::P0dot2 => "P0.2",
            Metric::P0dot1 => "P0.1",
            Metric::OnePercentLowAverage => "1% Low Avg",
            Metric::ZerodotTwoPercentLowAverage => "0.2% Low Avg",
            Metric::ZerodotOnePercentLowAverage => "0.1% Low Avg",
            Metric::OnePercentLowIntegral => "1% Low Int",
            Metric::ZerodotTwoPercentLowIntegral => "0.2% Low Int",
            Metric::ZerodotOnePercentLowIntegral => "0.1% Low Int",
            Metric::Min => "Min",
            Metric::AdaptiveStd => "Adp STDEV",
            Metric::CpuFpsPerWatt => "CPU FPS/10W",
            Metric::GpuFpsPerWatt => "GPU FPS/10W",
            Metric::GpuActiveAverage => "GPU Avg",
            Metric::GpuActiveP1 => "GPU P1",
            Metric::GpuActiveOnePercentLowAverage => "GPU 1% Low Avg",
            Metric::CpuActiveAverage => "CPU Avg",
            Metric::None => "None",
        }
    }

    /// Identifier used in configuration files, e.g. `"P0dot1"`.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Max => "Max",
            Metric::P99 => "P99",
            Metric::P95 => "P95",
            Metric::Average => "Average",
            Metric::Median => "Median",
            Metric::P5 => "P5",
            Metric::P1 => "P1",
            Metric::P0dot2 => "P0dot2",
            Metric::P0dot1 => "P0dot1",
            Metric::OnePercentLowAverage => "OnePercentLowAverage",
            Metric::ZerodotTwoPercentLowAverage => "ZerodotTwoPercentLowAverage",
            Metric::ZerodotOnePercentLowAverage => "ZerodotOnePercentLowAverage",
            Metric::OnePercentLowIntegral => "OnePercentLowIntegral",
            Metric::ZerodotTwoPercentLowIntegral => "ZerodotTwoPercentLowIntegral",
            Metric::ZerodotOnePercentLowIntegral => "ZerodotOnePercentLowIntegral",
            Metric::Min => "Min",
            Metric::AdaptiveStd => "AdaptiveStd",
            Metric::CpuFpsPerWatt => "CpuFpsPerWatt",
            Metric::GpuFpsPerWatt => "GpuFpsPerWatt",
            Metric::GpuActiveAverage => "GpuActiveAverage",
            Metric::GpuActiveP1 => "GpuActiveP1",
            Metric::GpuActiveOnePercentLowAverage => "GpuActiveOnePercentLowAverage",
            Metric::CpuActiveAverage => "CpuActiveAverage",
            Metric::None => "None",
        }
    }

    /// Power-normalised metrics go through `physical_metric`.
    pub fn is_physical(&self) -> bool {
        matches!(self, Metric::CpuFpsPerWatt | Metric::GpuFpsPerWatt)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown metric name: {0}")]
pub struct ParseMetricError(pub String);

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|metric| metric.name() == trimmed)
            .ok_or_else(|| ParseMetricError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_metric_name() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(
            "P42".parse::<Metric>(),
            Err(ParseMetricError("P42".to_string()))
        );
    }

    #[test]
    fn test_short_descriptions() {
        assert_eq!(Metric::P0dot1.short_description(), "P0.1");
        assert_eq!(Metric::OnePercentLowIntegral.short_description(), "1% Low Int");
        assert_eq!(Metric::Average.to_string(), "Average");
    }

    #[test]
    fn test_physical_metrics() {
        let physical: Vec<Metric> = Metric::ALL.into_iter().filter(Metric::is_physical).collect();
        assert_eq!(physical, vec![Metric::CpuFpsPerWatt, Metric::GpuFpsPerWatt]);
    }
}
