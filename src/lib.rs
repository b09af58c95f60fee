// src/lib.rs
pub mod scoring;
pub mod store;
pub mod waveform;

pub use scoring::{PsgScoring, RespiratoryEventType, ScoringSummary, SleepStage};
pub use store::{ChannelDataList, DataBatchItem, IngestError, SharedChannelDataList, TimeRange};
pub use waveform::{ChannelPreferences, ChannelView, DisplayWindow, PlotPreferences, PreferenceSource};
