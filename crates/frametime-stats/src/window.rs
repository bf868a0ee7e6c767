//! Sliding time windows over a bound capture session.
//!
//! A [`TimeWindowServer`] is either unbound or bound to one
//! [`CaptureSession`]. Every query slices the session to the rows whose start
//! time lies in `[current_time, current_time + window_length)` and only then
//! runs outlier adjustment, so the same window always yields the same values
//! regardless of what lies outside it.
//!
//! [`FilterMode::TimeIntervalAverage`] is the exception: the trailing average
//! needs the history before the window, so the points queries adjust and
//! average everything from the session start up to the window end and cut
//! the result to the window afterwards.
//!
//! GPU-busy rows of zero have no FPS equivalent and are dropped from the FPS
//! queries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StatisticsConfig;
use crate::distribution::{time_weighted_distribution, DEFAULT_TIME_INCREMENT_MS};
use crate::error::{Result, StatsError};
use crate::metrics::calculator::round_to;
use crate::session::{CaptureSession, Channel, Point};
use crate::stats::filter::{apply, time_interval_average, FilterMode};
use crate::stats::outliers::{adjust, RemoveOutlierMethod};

/// Half-open time interval `[current_time, current_time + window_length)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub current_time: f64,
    pub window_length: f64,
}

impl TimeWindow {
    pub fn new(current_time: f64, window_length: f64) -> Result<Self> {
        check_window_length(window_length)?;
        if !current_time.is_finite() {
            return Err(StatsError::InvalidWindow(format!(
                "window start must be finite, got {current_time}"
            )));
        }
        Ok(Self {
            current_time,
            window_length,
        })
    }

    pub fn end(&self) -> f64 {
        self.current_time + self.window_length
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.current_time && time < self.end()
    }
}

impl Default for TimeWindow {
    /// Starts at zero and spans everything.
    fn default() -> Self {
        Self {
            current_time: 0.0,
            window_length: f64::MAX,
        }
    }
}

fn check_window_length(window_length: f64) -> Result<()> {
    if !window_length.is_finite() || window_length <= 0.0 {
        return Err(StatsError::InvalidWindow(format!(
            "window length must be positive, got {window_length}"
        )));
    }
    Ok(())
}

fn to_fps(points: Vec<Point>) -> Vec<Point> {
    points
        .into_iter()
        .filter(|point| point.y > 0.0)
        .map(|point| Point::new(point.x, 1000.0 / point.y))
        .collect()
}

fn values(points: &[Point]) -> Vec<f64> {
    points.iter().map(|point| point.y).collect()
}

fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::EmptySequence);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Serves windowed views of a capture session.
///
/// Queries return `Ok(None)` while no session is bound, or when the bound
/// session lacks the requested channel.
#[derive(Debug, Clone, Default)]
pub struct TimeWindowServer {
    config: StatisticsConfig,
    session: Option<CaptureSession>,
    window: TimeWindow,
    remove_outlier_method: RemoveOutlierMethod,
    filter_mode: FilterMode,
}

impl TimeWindowServer {
    /// Unbound server; outlier method and filter mode start from `config`.
    pub fn new(config: StatisticsConfig) -> Self {
        Self {
            remove_outlier_method: config.remove_outlier_method,
            filter_mode: config.filter_mode,
            config,
            session: None,
            window: TimeWindow::default(),
        }
    }

    pub fn bind(&mut self, session: CaptureSession) {
        debug!(
            samples = session.len(),
            duration_s = session.duration_s(),
            "binding capture session"
        );
        self.session = Some(session);
    }

    /// Unbind and return the current session.
    pub fn clear(&mut self) -> Option<CaptureSession> {
        self.session.take()
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn set_current_time(&mut self, current_time: f64) -> Result<()> {
        self.window = TimeWindow::new(current_time, self.window.window_length)?;
        Ok(())
    }

    pub fn set_window_length(&mut self, window_length: f64) -> Result<()> {
        self.window = TimeWindow::new(self.window.current_time, window_length)?;
        Ok(())
    }

    /// Move and resize the window in one step.
    pub fn set_window(&mut self, current_time: f64, window_length: f64) -> Result<()> {
        self.window = TimeWindow::new(current_time, window_length)?;
        debug!(current_time, window_length, "time window updated");
        Ok(())
    }

    pub fn remove_outlier_method(&self) -> RemoveOutlierMethod {
        self.remove_outlier_method
    }

    pub fn set_remove_outlier_method(&mut self, method: RemoveOutlierMethod) {
        self.remove_outlier_method = method;
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter_mode = mode;
    }

    /// Adjusted `(start_time, value)` pairs of `channel` for rows with start
    /// time in `[start, end)`.
    fn channel_points(&self, channel: Channel, start: f64, end: f64) -> Result<Option<Vec<Point>>> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        let Some(column) = session.channel(channel) else {
            return Ok(None);
        };

        let range = session.index_range(start, end);
        let adjusted = adjust(&column[range.clone()], self.remove_outlier_method)?;
        Ok(Some(
            session.start_times()[range]
                .iter()
                .zip(adjusted)
                .map(|(&time, value)| Point::new(time, value))
                .collect(),
        ))
    }

    fn window_points(&self, channel: Channel) -> Result<Option<Vec<Point>>> {
        self.channel_points(channel, self.window.current_time, self.window.end())
    }

    fn window_values(&self, channel: Channel) -> Result<Option<Vec<f64>>> {
        Ok(self.window_points(channel)?.map(|points| values(&points)))
    }

    /// Points of `channel` in the window, smoothed by the current filter mode.
    ///
    /// The time-interval filter is trailing, so it is fed the history from the
    /// session start and cut to the window afterwards.
    fn filtered_points(&self, channel: Channel) -> Result<Option<Vec<Point>>> {
        match self.filter_mode {
            FilterMode::None => self.window_points(channel),
            FilterMode::MovingAverage | FilterMode::Median => {
                let Some(points) = self.window_points(channel)? else {
                    return Ok(None);
                };
                let smoothed = apply(
                    &values(&points),
                    self.filter_mode,
                    self.config.moving_average_window_size,
                )?;
                Ok(Some(
                    points
                        .iter()
                        .zip(smoothed)
                        .map(|(point, value)| Point::new(point.x, value))
                        .collect(),
                ))
            }
            FilterMode::TimeIntervalAverage => {
                let Some(history) =
                    self.channel_points(channel, f64::NEG_INFINITY, self.window.end())?
                else {
                    return Ok(None);
                };
                let averaged = time_interval_average(&history, self.config.interval_average_window_s)?;
                Ok(Some(
                    averaged
                        .into_iter()
                        .filter(|point| point.x >= self.window.current_time)
                        .collect(),
                ))
            }
        }
    }

    pub fn frametime_window(&self) -> Result<Option<Vec<f64>>> {
        self.window_values(Channel::Frametime)
    }

    pub fn fps_window(&self) -> Result<Option<Vec<f64>>> {
        Ok(self
            .frametime_window()?
            .map(|frametimes| frametimes.into_iter().map(|ft| 1000.0 / ft).collect()))
    }

    /// Raw `(start_time, frametime)` points; the filter mode does not apply.
    pub fn frametime_points_window(&self) -> Result<Option<Vec<Point>>> {
        self.window_points(Channel::Frametime)
    }

    /// `(start_time, fps)` points, smoothed in the frametime domain first.
    pub fn fps_points_window(&self) -> Result<Option<Vec<Point>>> {
        Ok(self.filtered_points(Channel::Frametime)?.map(to_fps))
    }

    pub fn gpu_active_window(&self) -> Result<Option<Vec<f64>>> {
        self.window_values(Channel::GpuActive)
    }

    pub fn gpu_active_fps_window(&self) -> Result<Option<Vec<f64>>> {
        Ok(self
            .gpu_active_window()?
            .map(|times| times.into_iter().filter(|&t| t > 0.0).map(|t| 1000.0 / t).collect()))
    }

    pub fn gpu_active_points_window(&self) -> Result<Option<Vec<Point>>> {
        self.window_points(Channel::GpuActive)
    }

    pub fn gpu_active_fps_points_window(&self) -> Result<Option<Vec<Point>>> {
        Ok(self.filtered_points(Channel::GpuActive)?.map(to_fps))
    }

    pub fn cpu_active_window(&self) -> Result<Option<Vec<f64>>> {
        self.window_values(Channel::CpuActive)
    }

    /// How far the mean GPU-busy time is from the mean frametime, in whole
    /// percent. Small values mean the GPU is the bottleneck.
    pub fn gpu_active_deviation_percentage(&self) -> Result<Option<f64>> {
        let (Some(frametimes), Some(gpu_active)) = (self.frametime_window()?, self.gpu_active_window()?)
        else {
            return Ok(None);
        };

        let frametime_average = mean(&frametimes)?;
        let gpu_active_average = mean(&gpu_active)?;
        Ok(Some(round_to(
            ((gpu_active_average - frametime_average) / frametime_average * 100.0).abs(),
            0,
        )))
    }

    /// Time-weighted frametime distribution of the window in 0.05 ms bins.
    pub fn frametime_distribution_points(&self) -> Result<Option<Vec<Point>>> {
        match self.frametime_window()? {
            Some(frametimes) => {
                time_weighted_distribution(&frametimes, DEFAULT_TIME_INCREMENT_MS).map(Some)
            }
            None => Ok(None),
        }
    }
}
