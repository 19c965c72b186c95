use thiserror::Error;

/// Failures that stop an analysis before a result can be assembled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("input buffer contains no samples")]
    EmptyInput,

    #[error("recording too short: {duration_s:.2}s (minimum {min_s:.2}s)")]
    InsufficientDuration { duration_s: f64, min_s: f64 },

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("internal analysis failure: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Stable identifier used in serialized failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "empty_input",
            AnalysisError::InsufficientDuration { .. } => "insufficient_duration",
            AnalysisError::InvalidSampleRate(_) => "invalid_sample_rate",
            AnalysisError::Internal(_) => "internal",
        }
    }
}
