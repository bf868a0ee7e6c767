//! Typed capture session: the ingestion boundary of the engine.
//!
//! A [`CaptureSession`] stores the capture columns as parallel arrays
//! (struct-of-arrays). All validation happens here, once, when the columns are
//! accepted: equal lengths, finite values, positive frametimes and a
//! non-decreasing start-time column. Everything downstream can then assume
//! clean, index-aligned data.
//!
//! Column names coming from capture files are mapped to [`Channel`] in
//! [`Channel::from_column_name`]; nothing past this module matches on strings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StatsError};

/// A (time, value) pair handed to chart consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One row of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Absolute start time in seconds
    pub start_time: f64,
    /// Time between presents in milliseconds
    pub frametime_ms: f64,
    pub gpu_active_ms: Option<f64>,
    pub cpu_active_ms: Option<f64>,
}

/// Measurement columns a session can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    StartTime,
    Frametime,
    GpuActive,
    CpuActive,
    DisplayChange,
}

impl Channel {
    /// Map a capture-file column header to its channel.
    ///
    /// ```
    /// use frametime_stats::session::Channel;
    ///
    /// assert_eq!(Channel::from_column_name("MsBetweenPresents"), Some(Channel::Frametime));
    /// assert_eq!(Channel::from_column_name("Dropped"), None);
    /// ```
    pub fn from_column_name(name: &str) -> Option<Self> {
        match name.trim() {
            "TimeInSeconds" => Some(Channel::StartTime),
            "MsBetweenPresents" => Some(Channel::Frametime),
            "MsGPUActive" | "MsGpuActive" => Some(Channel::GpuActive),
            "MsCPUActive" | "MsCpuActive" => Some(Channel::CpuActive),
            "MsBetweenDisplayChange" => Some(Channel::DisplayChange),
            _ => None,
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            Channel::StartTime => "TimeInSeconds",
            Channel::Frametime => "MsBetweenPresents",
            Channel::GpuActive => "MsGPUActive",
            Channel::CpuActive => "MsCPUActive",
            Channel::DisplayChange => "MsBetweenDisplayChange",
        }
    }
}

/// Validated, index-aligned capture data for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSession {
    start_times: Vec<f64>,
    frametimes: Vec<f64>,
    gpu_active: Option<Vec<f64>>,
    cpu_active: Option<Vec<f64>>,
    display_change: Option<Vec<f64>>,
}

impl CaptureSession {
    /// Create a session from the mandatory start-time and frametime columns.
    ///
    /// # Errors
    ///
    /// * [`StatsError::LengthMismatch`] if the columns differ in length
    /// * [`StatsError::NonFiniteSample`] for NaN or infinite values
    /// * [`StatsError::NonPositiveFrametime`] for frametimes `<= 0`
    /// * [`StatsError::NonMonotonicTime`] if start times ever decrease
    pub fn new(start_times: Vec<f64>, frametimes: Vec<f64>) -> Result<Self> {
        check_length(start_times.len(), &frametimes)?;
        check_finite(&start_times)?;
        if let Some(index) = start_times.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(StatsError::NonMonotonicTime { index: index + 1 });
        }
        check_durations(&frametimes)?;

        Ok(Self {
            start_times,
            frametimes,
            gpu_active: None,
            cpu_active: None,
            display_change: None,
        })
    }

    /// Attach the GPU-busy column.
    ///
    /// Auxiliary columns may hold zeros (a dropped frame never reaches the
    /// display, for one) but never negative or non-finite values.
    pub fn with_gpu_active(mut self, gpu_active: Vec<f64>) -> Result<Self> {
        check_length(self.len(), &gpu_active)?;
        check_auxiliary(&gpu_active)?;
        self.gpu_active = Some(gpu_active);
        Ok(self)
    }

    /// Attach the CPU-busy column.
    pub fn with_cpu_active(mut self, cpu_active: Vec<f64>) -> Result<Self> {
        check_length(self.len(), &cpu_active)?;
        check_auxiliary(&cpu_active)?;
        self.cpu_active = Some(cpu_active);
        Ok(self)
    }

    /// Attach the display-change column.
    pub fn with_display_change(mut self, display_change: Vec<f64>) -> Result<Self> {
        check_length(self.len(), &display_change)?;
        check_auxiliary(&display_change)?;
        self.display_change = Some(display_change);
        Ok(self)
    }

    /// Build a session from named columns, ignoring columns the engine does not use.
    ///
    /// Both `TimeInSeconds` and `MsBetweenPresents` are required; a missing one
    /// is reported as an empty sequence.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        let mut start_times = None;
        let mut frametimes = None;
        let mut gpu_active = None;
        let mut cpu_active = None;
        let mut display_change = None;

        for (name, values) in columns {
            match Channel::from_column_name(name.as_ref()) {
                Some(Channel::StartTime) => start_times = Some(values),
                Some(Channel::Frametime) => frametimes = Some(values),
                Some(Channel::GpuActive) => gpu_active = Some(values),
                Some(Channel::CpuActive) => cpu_active = Some(values),
                Some(Channel::DisplayChange) => display_change = Some(values),
                None => debug!(column = name.as_ref(), "ignoring unknown capture column"),
            }
        }

        let (Some(start_times), Some(frametimes)) = (start_times, frametimes) else {
            return Err(StatsError::EmptySequence);
        };

        let mut session = Self::new(start_times, frametimes)?;
        if let Some(values) = gpu_active {
            session = session.with_gpu_active(values)?;
        }
        if let Some(values) = cpu_active {
            session = session.with_cpu_active(values)?;
        }
        if let Some(values) = display_change {
            session = session.with_display_change(values)?;
        }
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.frametimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frametimes.is_empty()
    }

    pub fn start_times(&self) -> &[f64] {
        &self.start_times
    }

    pub fn frametimes(&self) -> &[f64] {
        &self.frametimes
    }

    pub fn gpu_active(&self) -> Option<&[f64]> {
        self.gpu_active.as_deref()
    }

    pub fn cpu_active(&self) -> Option<&[f64]> {
        self.cpu_active.as_deref()
    }

    pub fn display_change(&self) -> Option<&[f64]> {
        self.display_change.as_deref()
    }

    /// Column for `channel`, if the session carries it.
    pub fn channel(&self, channel: Channel) -> Option<&[f64]> {
        match channel {
            Channel::StartTime => Some(&self.start_times),
            Channel::Frametime => Some(&self.frametimes),
            Channel::GpuActive => self.gpu_active(),
            Channel::CpuActive => self.cpu_active(),
            Channel::DisplayChange => self.display_change(),
        }
    }

    pub fn sample(&self, index: usize) -> Option<FrameSample> {
        Some(FrameSample {
            start_time: *self.start_times.get(index)?,
            frametime_ms: *self.frametimes.get(index)?,
            gpu_active_ms: self.gpu_active.as_ref().map(|column| column[index]),
            cpu_active_ms: self.cpu_active.as_ref().map(|column| column[index]),
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = FrameSample> + '_ {
        (0..self.len()).filter_map(move |index| self.sample(index))
    }

    /// Session length in seconds, measured from the first start time to the
    /// end of the last frame.
    pub fn duration_s(&self) -> f64 {
        match (self.start_times.first(), self.start_times.last(), self.frametimes.last()) {
            (Some(first), Some(last), Some(frametime)) => last - first + frametime / 1000.0,
            _ => 0.0,
        }
    }

    /// Index range of the rows whose start time lies in `[start, end)`.
    pub(crate) fn index_range(&self, start: f64, end: f64) -> std::ops::Range<usize> {
        let lower = self.start_times.partition_point(|&t| t < start);
        let upper = self.start_times.partition_point(|&t| t < end);
        lower..upper.max(lower)
    }
}

fn check_length(expected: usize, column: &[f64]) -> Result<()> {
    if column.len() != expected {
        return Err(StatsError::LengthMismatch {
            expected,
            actual: column.len(),
        });
    }
    Ok(())
}

fn check_finite(column: &[f64]) -> Result<()> {
    match column.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(StatsError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

fn check_durations(column: &[f64]) -> Result<()> {
    check_finite(column)?;
    match column.iter().position(|&value| value <= 0.0) {
        Some(index) => Err(StatsError::NonPositiveFrametime { index }),
        None => Ok(()),
    }
}

fn check_auxiliary(column: &[f64]) -> Result<()> {
    check_finite(column)?;
    match column.iter().position(|&value| value < 0.0) {
        Some(index) => Err(StatsError::NegativeDuration { index }),
        None => Ok(()),
    }
}
