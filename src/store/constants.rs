/// Relative tolerance (fraction of the chunk sampling time) for appending a
/// batch onto an evenly-spaced chunk.
pub const MERGE_TOLERANCE: f64 = 0.01;
/// Distance (fraction of one sample) within which a time snaps to a sample.
pub const INDEX_SNAP_TOLERANCE: f64 = 0.001;

/// Channel names that carry scoring data instead of signal samples.
pub const SLEEP_STAGE_CHANNEL: &str = "Sleep Stage";
pub const RESPIRATORY_EVENT_CHANNEL: &str = "Respiratory Event";

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;
