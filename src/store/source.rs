use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::error::{IngestError, Result};
use super::raw_values::RawValues;

/// One channel's worth of samples as delivered by a collaborator.
///
/// `times` carries one time per sample (irregular), the first and last
/// sample times (evenly spaced), a single time for a single sample, or
/// `[start, interval]` when the second entry is smaller than the first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBatchItem {
    pub channel_name: String,
    pub times: Vec<f64>,
    pub values: RawValues,
    #[serde(rename = "sentByUserID", default, skip_serializing_if = "Option::is_none")]
    pub sent_by_user_id: Option<i64>,
    #[serde(rename = "dataID", default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<i64>,
}

impl DataBatchItem {
    pub fn new(channel_name: impl Into<String>, times: Vec<f64>, values: RawValues) -> Self {
        Self {
            channel_name: channel_name.into(),
            times,
            values,
            sent_by_user_id: None,
            data_id: None,
        }
    }

    /// Scorer that produced this item, if it is an annotation.
    pub fn scorer_id(&self) -> Option<i64> {
        self.sent_by_user_id.filter(|id| *id != 0)
    }

    pub fn is_annotation(&self) -> bool {
        self.scorer_id().is_some()
    }

    /// Brings `times` to stored form: two boundary times for evenly spaced
    /// data, one time per sample otherwise. Rejects malformed items.
    pub fn normalize(&mut self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(IngestError::EmptyChannelName);
        }
        let count = self.values.len();
        if count == 0 {
            return Err(IngestError::EmptyBatch(self.channel_name.clone()));
        }
        if self.times.iter().any(|t| !t.is_finite()) {
            return Err(IngestError::NonFiniteTime(self.channel_name.clone()));
        }
        match self.times.len() {
            0 => {
                return Err(IngestError::TooFewTimes {
                    expected: 1,
                    actual: 0,
                })
            }
            1 => {
                if count != 1 {
                    return Err(IngestError::SingleTimeMultipleValues(
                        self.channel_name.clone(),
                    ));
                }
                self.times.push(self.times[0]);
            }
            2 => {
                if self.times[1] < self.times[0] {
                    self.times[1] = self.times[0] + (count - 1) as f64 * self.times[1];
                }
            }
            n => {
                if n != count {
                    return Err(IngestError::SampleCountMismatch {
                        channel: self.channel_name.clone(),
                        times: n,
                        values: count,
                    });
                }
                if self.times.windows(2).any(|pair| pair[1] < pair[0]) {
                    return Err(IngestError::UnsortedTimes(self.channel_name.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Anything that can yield batches on demand.
pub trait BatchSource {
    fn next_batch(&mut self) -> Result<Option<Vec<DataBatchItem>>>;
}

/// In-memory source for tests and file playback.
pub struct ManualSource {
    queue: VecDeque<Vec<DataBatchItem>>,
}

impl ManualSource {
    pub fn new(batches: impl IntoIterator<Item = Vec<DataBatchItem>>) -> Self {
        Self {
            queue: batches.into_iter().collect(),
        }
    }
}

impl BatchSource for ManualSource {
    fn next_batch(&mut self) -> Result<Option<Vec<DataBatchItem>>> {
        Ok(self.queue.pop_front())
    }
}
