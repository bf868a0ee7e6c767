//! End-to-end checks over a synthetic capture session
//!
//! A session is built from named columns the way a capture loader would hand
//! them over, then run through the calculator, the analysis helpers, the
//! time-window server and the reporter.

use frametime_stats::report::REPORT_METRICS;
use frametime_stats::{
    discrete_distribution, metric_analysis, outlier_analysis, CaptureSession, Channel, FilterMode,
    Metric, MetricCalculator, OutputFormat, Point, RelatedMetric, RemoveOutlierMethod, Reporter,
    SessionReport, StatisticsConfig, StatsError, TimeWindowServer,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Ten seconds at 100 FPS with a 60 ms hitch every two seconds.
fn capture_columns() -> Vec<(&'static str, Vec<f64>)> {
    let mut start_times = Vec::new();
    let mut frametimes = Vec::new();
    let mut gpu_active = Vec::new();
    let mut time = 0.0;
    for i in 0..1000 {
        let frametime = if i % 200 == 199 { 60.0 } else { 10.0 };
        start_times.push(time);
        frametimes.push(frametime);
        gpu_active.push(frametime * 0.9);
        time += frametime / 1000.0;
    }
    vec![
        ("TimeInSeconds", start_times),
        ("MsBetweenPresents", frametimes),
        ("MsGPUActive", gpu_active),
        ("Dropped", vec![0.0; 1000]),
    ]
}

fn capture_session() -> CaptureSession {
    CaptureSession::from_columns(capture_columns()).unwrap()
}

// ============================================================================
// Session ingestion
// ============================================================================

#[test]
fn test_from_columns_maps_channels() {
    let session = capture_session();
    assert_eq!(session.len(), 1000);
    assert!(session.channel(Channel::GpuActive).is_some());
    assert_eq!(session.channel(Channel::CpuActive), None);
    assert_eq!(session.sample(199).unwrap().frametime_ms, 60.0);
}

#[test]
fn test_from_columns_rejects_short_column() {
    let mut columns = capture_columns();
    columns[2].1.pop();
    assert_eq!(
        CaptureSession::from_columns(columns),
        Err(StatsError::LengthMismatch {
            expected: 1000,
            actual: 999
        })
    );
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_headline_metrics() {
    init_tracing();
    let session = capture_session();
    let calculator = MetricCalculator::default();
    let frametimes = session.frametimes();

    // 1000 frames over 10.25 s
    assert_eq!(calculator.fps_metric(frametimes, Metric::Average), Ok(97.56));
    assert_eq!(calculator.fps_metric(frametimes, Metric::Max), Ok(100.0));
    assert_eq!(calculator.fps_metric(frametimes, Metric::Min), Ok(16.67));
    assert_eq!(calculator.fps_metric(frametimes, Metric::Median), Ok(100.0));

    // five hitches are 0.5% of frames, so the 1% low average mixes in fast frames
    assert_eq!(
        calculator.frametime_metric(frametimes, Metric::OnePercentLowAverage),
        Ok(35.0)
    );
    assert_eq!(
        calculator.frametime_metric(frametimes, Metric::ZerodotOnePercentLowAverage),
        Ok(60.0)
    );
    // 1% of 10.25 s is covered by two hitches
    assert_eq!(
        calculator.frametime_metric(frametimes, Metric::OnePercentLowIntegral),
        Ok(60.0)
    );
}

#[test]
fn test_stutter_figures() {
    let session = capture_session();
    let calculator = MetricCalculator::default();
    let frametimes = session.frametimes();

    assert_eq!(calculator.stuttering_count_percentage(frametimes, 2.5), Ok(0.5));
    let time_share = calculator.stuttering_time_percentage(frametimes, 2.5).unwrap();
    assert!((time_share - 100.0 * 300.0 / 10250.0).abs() < 1e-9);
    assert_eq!(calculator.low_fps_time_percentage(frametimes, 2.5, 25.0), Ok(0.0));
}

#[test]
fn test_power_normalised_metric() {
    let session = capture_session();
    let calculator = MetricCalculator::default();
    assert_eq!(
        calculator.physical_metric(session.frametimes(), Metric::GpuFpsPerWatt, 200.0),
        Ok(4.88)
    );
}

#[test]
fn test_distribution_covers_every_frame() {
    let session = capture_session();
    let distribution = discrete_distribution(session.frametimes()).unwrap();
    assert_eq!(distribution.total(), 1000);
    assert_eq!(distribution.counts()[0], 995);
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_metric_analysis_and_run_comparison() {
    let calculator = MetricCalculator::default();
    let steady = vec![10.0; 500];
    let mut slow = vec![12.0; 500];
    slow[0] = 30.0;

    let runs = vec![
        metric_analysis(&calculator, &steady, Metric::P1, Metric::None).unwrap(),
        metric_analysis(&calculator, &steady, Metric::P1, Metric::None).unwrap(),
        metric_analysis(&calculator, &slow, Metric::P1, Metric::None).unwrap(),
    ];

    assert_eq!(runs[0].result_string, "Avg=100.00 FPS | P1=100.00 FPS");
    assert_eq!(
        outlier_analysis(&runs, RelatedMetric::Average, 3.0),
        vec![false, false, true]
    );
    assert_eq!(
        outlier_analysis(&runs, RelatedMetric::Third, 3.0),
        vec![false, false, false]
    );
}

// ============================================================================
// Time windows
// ============================================================================

#[test]
fn test_window_over_named_columns() {
    let mut server = TimeWindowServer::new(StatisticsConfig::default());
    assert_eq!(server.fps_window(), Ok(None));

    server.bind(capture_session());
    server.set_window(2.0, 1.0).unwrap();

    let frametimes = server.frametime_window().unwrap().unwrap();
    assert!(frametimes.iter().all(|&ft| ft == 10.0));

    let deviation = server.gpu_active_deviation_percentage().unwrap();
    assert_eq!(deviation, Some(10.0));
}

#[test]
fn test_window_with_outlier_removal_and_smoothing() {
    let config = StatisticsConfig {
        remove_outlier_method: RemoveOutlierMethod::InterquartileRange,
        filter_mode: FilterMode::MovingAverage,
        moving_average_window_size: 5,
        ..StatisticsConfig::default()
    };
    let mut server = TimeWindowServer::new(config);
    server.bind(capture_session());
    server.set_window(1.9, 0.2).unwrap();

    let frametimes = server.frametime_window().unwrap().unwrap();
    assert!(frametimes.iter().all(|&ft| ft == 10.0), "{frametimes:?}");

    let points = server.fps_points_window().unwrap().unwrap();
    assert_eq!(points.len(), frametimes.len());
    assert!(points.iter().all(|point| (point.y - 100.0).abs() < 1e-9));
}

#[test]
fn test_window_matches_half_open_interval() {
    let session = CaptureSession::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![10.0; 5]).unwrap();
    let mut server = TimeWindowServer::default();
    server.bind(session);
    server.set_window(1.0, 2.0).unwrap();

    assert_eq!(
        server.frametime_points_window().unwrap().unwrap(),
        vec![Point::new(1.0, 10.0), Point::new(2.0, 10.0)]
    );
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_report_formats() {
    let calculator = MetricCalculator::default();
    let report = SessionReport::build(
        "Hitching run",
        &calculator,
        &capture_session(),
        Metric::P1,
        Metric::OnePercentLowIntegral,
    )
    .unwrap();

    assert_eq!(report.fps_metrics.len(), REPORT_METRICS.len());
    assert_eq!(report.fps(Metric::Average), Some(97.56));
    assert_eq!(report.stuttering_count_percentage, 0.5);

    let console = Reporter::new(OutputFormat::Console)
        .format_report(&report)
        .unwrap();
    assert!(console.contains("Hitching run"));
    assert!(console.contains("1% Low Int"));

    let json = Reporter::new(OutputFormat::JsonPretty)
        .format_report(&report)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["frame_count"], 1000);
    assert_eq!(value["thresholds"].as_array().unwrap().len(), 10);
}
