use thiserror::Error;

use crate::metrics::Metric;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Sequence is empty")]
    EmptySequence,

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Metric {0:?} has no computation rule for this operation")]
    UnknownMetric(Metric),

    #[error("Sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    #[error("Frametime at index {index} is not positive")]
    NonPositiveFrametime { index: usize },

    #[error("Duration at index {index} is negative")]
    NegativeDuration { index: usize },

    #[error("Column length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Start time at index {index} is earlier than its predecessor")]
    NonMonotonicTime { index: usize },

    #[error("Invalid coefficient: {0}")]
    InvalidCoefficient(f64),

    #[error("Invalid percentile: {0}")]
    InvalidPercentile(f64),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Reject empty sequences and any NaN or infinite sample.
pub(crate) fn validate_sequence(sequence: &[f64]) -> Result<()> {
    if sequence.is_empty() {
        return Err(StatsError::EmptySequence);
    }
    match sequence.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(StatsError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

/// Like [`validate_sequence`], additionally requiring every frametime to be positive.
pub(crate) fn validate_frametimes(frametimes: &[f64]) -> Result<()> {
    validate_sequence(frametimes)?;
    match frametimes.iter().position(|&value| value <= 0.0) {
        Some(index) => Err(StatsError::NonPositiveFrametime { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_sequence(&[]), Err(StatsError::EmptySequence));
    }

    #[test]
    fn test_validate_nan() {
        let samples = vec![1.0, f64::NAN, 3.0];
        assert_eq!(
            validate_sequence(&samples),
            Err(StatsError::NonFiniteSample { index: 1 })
        );
    }

    #[test]
    fn test_validate_frametimes_rejects_zero() {
        let samples = vec![16.6, 0.0];
        assert_eq!(
            validate_frametimes(&samples),
            Err(StatsError::NonPositiveFrametime { index: 1 })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StatsError::EmptySequence.to_string(), "Sequence is empty");
        assert_eq!(
            StatsError::UnknownMetric(Metric::None).to_string(),
            "Metric None has no computation rule for this operation"
        );
    }
}
