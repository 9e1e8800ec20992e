use thiserror::Error;

/// costlens error types
#[derive(Error, Debug)]
pub enum CostlensError {
    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Report cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Period bounds out of order
    #[error("invalid period: {start} is after {end}")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Result type alias for costlens
pub type Result<T> = std::result::Result<T, CostlensError>;

/// Failure reported by a cost source.
///
/// Only the upstream message is kept; classification happens later against it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
