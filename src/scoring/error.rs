use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring needs a recording time range; no data has been received yet")]
    NoRecordingRange,
}
