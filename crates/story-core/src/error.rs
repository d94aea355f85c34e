//! Configuration errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid story config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("story config has no steps")]
    NoSteps,

    #[error("step {index} ({title}): correlation {value} is outside [-1, 1]")]
    CorrelationOutOfRange {
        index: usize,
        title: String,
        value: f64,
    },

    #[error("sample count must be at least 2, got {0}")]
    SampleCount(usize),

    #[error("coverage threshold {0} is outside (0, 1]")]
    CoverageThreshold(f64),

    #[error("initial step {index} is out of range for {len} steps")]
    InitialStep { index: usize, len: usize },
}
