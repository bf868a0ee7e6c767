//! Console reporter for session reports
//!
//! Plain-text tables sized for an 80-column terminal.

use anyhow::Result;
use std::fmt::Write;

use super::SessionReport;
use crate::stats::PercentileSummary;

const RULE: &str = "────────────────────────────────────────────────────────────────";

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(report: &SessionReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    FRAMETIME STATISTICS                      ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Session:   {}", report.name)?;
        writeln!(output, "Frames:    {}", report.frame_count)?;
        writeln!(output, "Duration:  {:.2}s", report.duration_s)?;
        writeln!(output, "Summary:   {}", report.analysis.result_string)?;
        writeln!(output)?;

        writeln!(output, "{RULE}")?;
        writeln!(output, "FPS Metrics")?;
        writeln!(output, "{RULE}")?;
        for value in &report.fps_metrics {
            writeln!(
                output,
                "  {:<16} {:>10.2}",
                value.metric.short_description(),
                value.fps
            )?;
        }
        writeln!(output)?;

        Self::format_frametimes(&mut output, &report.frametime_summary)?;

        writeln!(output, "{RULE}")?;
        writeln!(output, "Stuttering")?;
        writeln!(output, "{RULE}")?;
        writeln!(output, "  Stutter frames:   {:.2}%", report.stuttering_count_percentage)?;
        writeln!(output, "  Stutter time:     {:.2}%", report.stuttering_time_percentage)?;
        writeln!(output, "  Low FPS time:     {:.2}%", report.low_fps_time_percentage)?;
        writeln!(output)?;

        writeln!(output, "{RULE}")?;
        writeln!(output, "Time Below FPS Threshold")?;
        writeln!(output, "{RULE}")?;
        writeln!(output, "  ┌─────────┬──────────┬──────────┐")?;
        writeln!(output, "  │   FPS   │  Frames  │   Time   │")?;
        writeln!(output, "  ├─────────┼──────────┼──────────┤")?;
        for share in &report.thresholds {
            writeln!(
                output,
                "  │ {:>7} │ {:>8} │ {:>7.2}% │",
                share.threshold_fps, share.frames, share.time_percentage
            )?;
        }
        writeln!(output, "  └─────────┴──────────┴──────────┘")?;
        writeln!(output)?;

        Ok(output)
    }

    fn format_frametimes(output: &mut String, summary: &PercentileSummary) -> Result<()> {
        writeln!(output, "{RULE}")?;
        writeln!(output, "Frametimes (ms)")?;
        writeln!(output, "{RULE}")?;
        writeln!(output, "  ┌─────────┬─────────┬─────────┬─────────┬─────────┐")?;
        writeln!(output, "  │   Min   │   P50   │   P95   │   P99   │   Max   │")?;
        writeln!(output, "  ├─────────┼─────────┼─────────┼─────────┼─────────┤")?;
        writeln!(
            output,
            "  │ {:>7.2} │ {:>7.2} │ {:>7.2} │ {:>7.2} │ {:>7.2} │",
            summary.min, summary.p50, summary.p95, summary.p99, summary.max
        )?;
        writeln!(output, "  └─────────┴─────────┴─────────┴─────────┴─────────┘")?;
        writeln!(
            output,
            "  Mean: {:.2}ms, StdDev: {:.2}ms, CV: {:.2}%",
            summary.mean,
            summary.std_dev,
            summary.coefficient_of_variation() * 100.0
        )?;
        writeln!(output)?;
        Ok(())
    }
}
