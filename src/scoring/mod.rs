// src/scoring/mod.rs
pub mod error;
pub mod history;
pub mod psg;
pub mod summary;

pub use error::ScoringError;
pub use history::History;
pub use psg::{
    stage_from_label, stage_label, PsgScoring, RespiratoryEvent, RespiratoryEventType, SleepStage,
};
pub use summary::{EventTotal, ReportRow, ScoringSummary, StageTotal};

/// Length of one scoring epoch.
pub const EPOCH_DURATION_SECS: f64 = 30.0;
/// Snapshots kept for undo/redo.
pub const MAX_HISTORY_LENGTH: usize = 20;
