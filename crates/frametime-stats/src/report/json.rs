//! JSON reporter for session reports

use anyhow::Result;

use super::SessionReport;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize `report`, pretty-printed when `pretty` is set.
    pub fn format(report: &SessionReport, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::create_test_report;

    #[test]
    fn test_json_format_compact() {
        let report = create_test_report();
        let output = JsonReporter::format(&report, false).unwrap();

        assert!(!output.contains('\n'));
        assert!(output.contains("\"name\":\"Test Session\""));
        assert!(output.contains("\"frame_count\":100"));
    }

    #[test]
    fn test_json_format_pretty() {
        let report = create_test_report();
        let output = JsonReporter::format(&report, true).unwrap();

        assert!(output.contains('\n'));
        assert!(output.contains("  \"analysis\""));
    }

    #[test]
    fn test_json_parses_back() {
        let report = create_test_report();
        let json = JsonReporter::format(&report, false).unwrap();
        let parsed: SessionReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.name, report.name);
        assert_eq!(parsed.analysis.result_string, report.analysis.result_string);
        assert_eq!(parsed.fps_metrics.len(), report.fps_metrics.len());
        assert_eq!(parsed.thresholds[0].frames, report.thresholds[0].frames);
    }
}
