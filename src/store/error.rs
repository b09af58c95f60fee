use thiserror::Error;

use crate::scoring::ScoringError;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("channel name must not be empty")]
    EmptyChannelName,
    #[error("batch for {0} carries no samples")]
    EmptyBatch(String),
    #[error("invalid times: need at least {expected} boundary times, got {actual}")]
    TooFewTimes { expected: usize, actual: usize },
    #[error("invalid data format for {0} (times.length = 1 while values.length != 1)")]
    SingleTimeMultipleValues(String),
    #[error("sample count mismatch for {channel}: {times} times, {values} values")]
    SampleCountMismatch {
        channel: String,
        times: usize,
        values: usize,
    },
    #[error("times for {0} are not finite")]
    NonFiniteTime(String),
    #[error("times for {0} are not in ascending order")]
    UnsortedTimes(String),
    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),
}
