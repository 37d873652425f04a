//! Scanner error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("invalid smoothing length {0}: must be at least 1")]
    InvalidParameter(usize),

    #[error("invalid parameter range {start}..={end}")]
    InvalidRange { start: usize, end: usize },

    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("no viable parameter in range {start}..={end}")]
    NoViableParameter { start: usize, end: usize },

    #[error("no usable price history for {symbol}: {reason}")]
    UpstreamData { symbol: String, reason: String },

    #[error("DI length {parameter} produced a non-finite return")]
    NonFiniteResult { parameter: usize },
}

pub type ScanResult<T> = Result<T, ScanError>;
