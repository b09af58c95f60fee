use log::debug;

use super::constants::{INDEX_SNAP_TOLERANCE, MERGE_TOLERANCE};
use super::error::{IngestError, Result};
use super::raw_values::RawValues;
use super::search::{binary_search, SearchPolicy};
use super::time_range::TimeRange;
use crate::waveform::SegmentView;

/// Contiguous run of samples. Evenly spaced chunks keep only their two
/// boundary times; irregular chunks keep one time per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct DataChunk {
    times: Vec<f64>,
    values: RawValues,
    is_evenly_spaced: bool,
    sampling_time: f64,
    time_range: TimeRange,
}

impl DataChunk {
    /// `times` must already be normalized: two boundary times, or one time per
    /// sample in ascending order.
    pub fn new(times: Vec<f64>, values: RawValues) -> Result<Self> {
        if times.len() < 2 {
            return Err(IngestError::TooFewTimes {
                expected: 2,
                actual: times.len(),
            });
        }
        if values.is_empty() {
            return Err(IngestError::EmptyBatch(String::new()));
        }
        let is_evenly_spaced = times.len() == 2;
        if !is_evenly_spaced && times.len() != values.len() {
            return Err(IngestError::SampleCountMismatch {
                channel: String::new(),
                times: times.len(),
                values: values.len(),
            });
        }
        let time_range = TimeRange::new(times[0], times[times.len() - 1]);
        let mut chunk = Self {
            times,
            values,
            is_evenly_spaced,
            sampling_time: 0.0,
            time_range,
        };
        chunk.sampling_time = chunk.implied_sampling_time();
        Ok(chunk)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn is_evenly_spaced(&self) -> bool {
        self.is_evenly_spaced
    }

    pub fn sampling_time(&self) -> f64 {
        self.sampling_time
    }

    pub fn plot_range(&self) -> [f64; 2] {
        self.values.plot_range()
    }

    /// Tries to append (or prepend) an evenly spaced batch that continues this
    /// chunk with the same encoding and spacing. Returns whether it merged.
    pub fn add(&mut self, times: &[f64], values: &RawValues) -> bool {
        if !self.is_evenly_spaced || times.len() != 2 || values.is_empty() {
            return false;
        }
        if !self.values.same_encoding(values) {
            return false;
        }
        let incoming = TimeRange::new(times[0], times[1]);
        let mut gap = incoming.start_time - self.time_range.end_time;
        if gap < 0.0 {
            gap = self.time_range.start_time - incoming.end_time;
        }
        let tolerance = MERGE_TOLERANCE * self.sampling_time;
        if !((gap - self.sampling_time).abs() < tolerance) {
            return false;
        }
        // A single sample has no spacing of its own to disagree with.
        if values.len() > 1 {
            let incoming_sampling_time = incoming.duration() / (values.len() - 1) as f64;
            if !((incoming_sampling_time - self.sampling_time).abs() < tolerance) {
                return false;
            }
        }

        let is_before = incoming.start_time < self.time_range.start_time;
        if is_before {
            self.times[0] = incoming.start_time;
        } else {
            self.times[1] = incoming.end_time;
        }
        self.values.add(values.clone(), is_before);
        self.time_range = TimeRange::new(self.times[0], self.times[1]);
        self.sampling_time = self.implied_sampling_time();
        debug!(
            "merged {} samples {} chunk, now {}",
            values.len(),
            if is_before { "before" } else { "after" },
            self.len()
        );
        true
    }

    /// Samples overlapping `window`, widened to the samples just outside it.
    pub fn get_data(&self, window: &TimeRange) -> SegmentView {
        let start = self.find_value_index(window.start_time, true);
        let end = self.find_value_index(window.end_time, false);
        let times = if self.is_evenly_spaced {
            (start..=end)
                .map(|i| self.time_range.start_time + i as f64 * self.sampling_time)
                .collect()
        } else {
            self.times[start..=end].to_vec()
        };
        SegmentView {
            times,
            values: self.values.get_values(start, end),
            plot_range: self.plot_range(),
            is_evenly_spaced: self.is_evenly_spaced,
            sampling_time: self.sampling_time,
            has_string_values: self.values.has_string_values(),
        }
    }

    /// Index of the sample at `time`, or the neighbour before/after it.
    /// Times outside the chunk clamp to the first or last sample.
    pub fn find_value_index(&self, time: f64, before: bool) -> usize {
        let count = self.len();
        if count <= 1 || time <= self.time_range.start_time {
            return 0;
        }
        if time >= self.time_range.end_time {
            return count - 1;
        }
        if self.is_evenly_spaced {
            let index = (time - self.time_range.start_time) / self.sampling_time;
            let nearest = index.round();
            let snapped = if (nearest - index).abs() < INDEX_SNAP_TOLERANCE {
                nearest
            } else if before {
                index.floor()
            } else {
                index.ceil()
            };
            return (snapped as usize).min(count - 1);
        }
        let policy = if before {
            SearchPolicy::AtOrBefore
        } else {
            SearchPolicy::AtOrAfter
        };
        binary_search(&self.times, time, policy).unwrap_or(if before { 0 } else { count - 1 })
    }

    fn implied_sampling_time(&self) -> f64 {
        let count = self.len();
        if count > 1 {
            self.time_range.duration() / (count - 1) as f64
        } else {
            0.0
        }
    }
}
