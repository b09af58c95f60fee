// Display pipeline (filters, decimation, preferences) lives in its own crate
// under `waveform-rs/`; compile its sources in place.
#[path = "waveform-rs/src/lib.rs"]
mod waveform_rs;

pub use waveform_rs::*;
