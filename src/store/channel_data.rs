use log::{debug, warn};

use super::data_chunk::DataChunk;
use super::error::{IngestError, Result};
use super::raw_values::RawValues;
use super::time_range::TimeRange;
use crate::waveform::SegmentView;

/// What happened to a batch handed to [`ChannelData::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Merged,
    Inserted,
    /// Overlaps stored data without continuing it; the batch was dropped.
    Duplicate,
}

/// All chunks of one channel, ordered by start time.
#[derive(Clone, Debug)]
pub struct ChannelData {
    channel_name: String,
    chunks: Vec<DataChunk>,
}

impl ChannelData {
    pub fn new(channel_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            chunks: Vec::new(),
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[DataChunk] {
        &self.chunks
    }

    pub fn plot_range(&self) -> Option<[f64; 2]> {
        self.chunks.first().map(DataChunk::plot_range)
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        let first = self.chunks.first()?;
        let last = self.chunks.last()?;
        Some(TimeRange::new(
            first.time_range().start_time,
            last.time_range().end_time,
        ))
    }

    /// Stores a normalized batch, merging it into the chunk it continues when
    /// possible.
    pub fn add(&mut self, times: Vec<f64>, values: RawValues) -> Result<AddOutcome> {
        if times.len() < 2 {
            return Err(IngestError::TooFewTimes {
                expected: 2,
                actual: times.len(),
            });
        }
        let incoming = TimeRange::new(times[0], times[times.len() - 1]);
        let Some(index) = self
            .chunks
            .iter()
            .rposition(|chunk| chunk.time_range().start_time <= incoming.start_time)
        else {
            if let Some(first) = self.chunks.first_mut() {
                if first.add(&times, &values) {
                    return Ok(AddOutcome::Merged);
                }
                if incoming.end_time >= first.time_range().start_time {
                    return Ok(self.report_duplicate(&incoming));
                }
            }
            self.chunks.insert(0, DataChunk::new(times, values)?);
            debug!("{}: new chunk at head", self.channel_name);
            return Ok(AddOutcome::Inserted);
        };

        if self.chunks[index].add(&times, &values) {
            return Ok(AddOutcome::Merged);
        }
        let after_previous = self.chunks[index].time_range().end_time < incoming.start_time;
        let before_next = self
            .chunks
            .get(index + 1)
            .map_or(true, |next| incoming.end_time < next.time_range().start_time);
        if !(after_previous && before_next) {
            return Ok(self.report_duplicate(&incoming));
        }
        self.chunks.insert(index + 1, DataChunk::new(times, values)?);
        debug!("{}: new chunk at {}", self.channel_name, index + 1);
        Ok(AddOutcome::Inserted)
    }

    /// Data of every chunk that intersects `window`, in time order.
    pub fn get_data(&self, window: &TimeRange) -> Vec<SegmentView> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.time_range().intersects(window))
            .map(|chunk| chunk.get_data(window))
            .collect()
    }

    fn report_duplicate(&self, incoming: &TimeRange) -> AddOutcome {
        warn!(
            "{}: batch {}..{} overlaps stored data, probably a duplicate; dropped",
            self.channel_name, incoming.start_time, incoming.end_time
        );
        AddOutcome::Duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::raw_values::DataType;

    fn values(data: &[f64]) -> RawValues {
        RawValues::numeric(DataType::Signed16, data.iter().copied())
    }

    #[test]
    fn contiguous_batches_share_one_chunk() {
        let mut channel = ChannelData::new("C3-M2");
        assert_eq!(channel.add(vec![0.0, 1.0], values(&[1.0, 2.0])).unwrap(), AddOutcome::Inserted);
        assert_eq!(channel.add(vec![2.0, 3.0], values(&[3.0, 4.0])).unwrap(), AddOutcome::Merged);
        assert_eq!(channel.chunk_count(), 1);
        let data = channel.get_data(&TimeRange::new(0.0, 3.0));
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].len(), 4);
    }

    #[test]
    fn gaps_open_new_chunks_in_order() {
        let mut channel = ChannelData::new("SpO2");
        channel.add(vec![10.0, 11.0], values(&[1.0, 2.0])).unwrap();
        channel.add(vec![20.0, 21.0], values(&[1.0, 2.0])).unwrap();
        assert_eq!(channel.add(vec![0.0, 1.0], values(&[1.0, 2.0])).unwrap(), AddOutcome::Inserted);
        assert_eq!(channel.add(vec![15.0, 16.0], values(&[1.0, 2.0])).unwrap(), AddOutcome::Inserted);
        let starts: Vec<f64> = channel
            .chunks()
            .iter()
            .map(|chunk| chunk.time_range().start_time)
            .collect();
        assert_eq!(starts, vec![0.0, 10.0, 15.0, 20.0]);
        assert_eq!(channel.time_range(), Some(TimeRange::new(0.0, 21.0)));
        assert_eq!(channel.get_data(&TimeRange::new(11.0, 15.5)).len(), 2);
    }

    #[test]
    fn prepending_batch_merges_into_first_chunk() {
        let mut channel = ChannelData::new("Thorax");
        channel.add(vec![10.0, 11.0], values(&[1.0, 2.0])).unwrap();
        assert_eq!(channel.add(vec![8.0, 9.0], values(&[0.0, 0.5])).unwrap(), AddOutcome::Merged);
        assert_eq!(channel.chunk_count(), 1);
        assert_eq!(channel.time_range(), Some(TimeRange::new(8.0, 11.0)));
    }

    #[test]
    fn overlapping_batch_is_reported_and_dropped() {
        let mut channel = ChannelData::new("Chin");
        channel.add(vec![0.0, 9.0], values(&[0.0; 10])).unwrap();
        assert_eq!(channel.add(vec![5.0, 14.0], values(&[1.0; 10])).unwrap(), AddOutcome::Duplicate);
        assert_eq!(channel.add(vec![0.0, 9.0], values(&[0.0; 10])).unwrap(), AddOutcome::Duplicate);
        assert_eq!(channel.add(vec![-5.0, 2.0], values(&[0.0; 8])).unwrap(), AddOutcome::Duplicate);
        assert_eq!(channel.chunk_count(), 1);
        assert_eq!(channel.get_data(&TimeRange::new(0.0, 9.0))[0].len(), 10);
    }

    #[test]
    fn plot_range_comes_from_first_chunk() {
        let mut channel = ChannelData::new("SpO2");
        assert_eq!(channel.plot_range(), None);
        channel
            .add(vec![0.0, 1.0], RawValues::numeric(DataType::Unsigned8, [95.0, 96.0]))
            .unwrap();
        assert_eq!(channel.plot_range(), Some([0.0, 256.0]));
    }
}
