use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};

use super::channel_data::{AddOutcome, ChannelData};
use super::error::Result;
use super::naming::canonical_channel_name;
use super::source::{BatchSource, DataBatchItem};
use super::time_range::{merge_times, TimeRange};
use crate::scoring::{PsgScoring, ScoringError};
use crate::waveform::{ChannelProcessor, ChannelView, DisplayWindow, PreferenceSource};

/// Handle for collaborators that feed and poll from different threads.
pub type SharedChannelDataList = Arc<Mutex<ChannelDataList>>;

/// Tally of one [`ChannelDataList::add`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub merged: usize,
    /// Channels that received a batch overlapping stored data.
    pub duplicates: Vec<String>,
    pub annotations: usize,
}

impl IngestReport {
    fn absorb(&mut self, other: IngestReport) {
        self.inserted += other.inserted;
        self.merged += other.merged;
        self.duplicates.extend(other.duplicates);
        self.annotations += other.annotations;
    }
}

/// Every channel of a recording plus the scorings made on it.
#[derive(Debug, Default)]
pub struct ChannelDataList {
    channels: Vec<ChannelData>,
    index: HashMap<String, usize>,
    time_range: Option<TimeRange>,
    scores: Vec<PsgScoring>,
    active_score: Option<usize>,
}

impl ChannelDataList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedChannelDataList {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Channels in order of first arrival.
    pub fn channels(&self) -> &[ChannelData] {
        &self.channels
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| channel.channel_name().to_owned())
            .collect()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelData> {
        self.index.get(name).map(|i| &self.channels[*i])
    }

    /// Span of everything received so far; `None` before the first batch.
    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    /// Ingests a batch. Every item is validated before any is stored, so a
    /// malformed item leaves the list untouched.
    pub fn add(&mut self, items: Vec<DataBatchItem>) -> Result<IngestReport> {
        let mut items = items;
        for item in &mut items {
            item.normalize()?;
        }

        // Widen with the whole batch before any annotation creates a scoring.
        for item in &items {
            merge_times(&mut self.time_range, &item.times)?;
        }

        let mut report = IngestReport::default();
        for item in items {
            if let Some(scorer_id) = item.scorer_id() {
                let data_id = item.data_id.unwrap_or_default();
                self.initialize_new_score(scorer_id, data_id)?
                    .add_data_chunk(&item);
                report.annotations += 1;
                continue;
            }

            let name = canonical_channel_name(&item.channel_name);
            if name != item.channel_name {
                debug!("{} stored as {}", item.channel_name, name);
            }
            let slot = match self.index.get(&name) {
                Some(slot) => *slot,
                None => {
                    info!("new channel {name}");
                    self.channels.push(ChannelData::new(name.clone()));
                    self.index.insert(name.clone(), self.channels.len() - 1);
                    self.channels.len() - 1
                }
            };
            match self.channels[slot].add(item.times, item.values)? {
                AddOutcome::Merged => report.merged += 1,
                AddOutcome::Inserted => report.inserted += 1,
                AddOutcome::Duplicate => report.duplicates.push(name),
            }
        }
        Ok(report)
    }

    /// Drains `source`, ingesting batch after batch.
    pub fn ingest_from(&mut self, source: &mut impl BatchSource) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        while let Some(batch) = source.next_batch()? {
            report.absorb(self.add(batch)?);
        }
        Ok(report)
    }

    /// Display-ready data of every visible channel for `window`.
    ///
    /// Each channel is fetched with enough lead-in for its filters to settle,
    /// referenced, filtered, trimmed back to the window and decimated to
    /// `window.pixel_budget`.
    pub fn get_data(
        &self,
        window: DisplayWindow,
        prefs: &mut impl PreferenceSource,
    ) -> Vec<ChannelView> {
        let names = self.channel_names();
        let mut views = Vec::new();
        for name in prefs.visible_ordered_channels(&names) {
            let Some(channel) = self.channel(&name) else {
                continue;
            };
            let channel_prefs = prefs.channel_preferences(&name);
            let fetch = TimeRange::new(window.start_time, window.end_time)
                .expanded_before(channel_prefs.settling_time_secs());

            let references: Vec<_> = channel_prefs
                .reference_channels
                .iter()
                .filter(|reference| **reference != name)
                .filter_map(|reference| {
                    let found = self.channel(reference);
                    if found.is_none() {
                        debug!("{name}: reference channel {reference} has no data");
                    }
                    found
                })
                .map(|reference| reference.get_data(&fetch))
                .collect();

            let data = ChannelProcessor::new(&channel_prefs, window)
                .process(channel.get_data(&fetch), &references);

            if channel_prefs.range.is_none() && !data.is_empty() {
                if let Some(range) = channel.plot_range() {
                    prefs.seed_range(&name, range);
                }
            }
            views.push(ChannelView {
                channel_name: name,
                data,
            });
        }
        views
    }

    pub fn scores(&self) -> &[PsgScoring] {
        &self.scores
    }

    pub fn active_score(&self) -> Option<&PsgScoring> {
        self.active_score.map(|i| &self.scores[i])
    }

    pub fn active_score_mut(&mut self) -> Option<&mut PsgScoring> {
        self.active_score.map(|i| &mut self.scores[i])
    }

    /// Makes `scorer_id`'s scoring the active one. Returns false if unknown.
    pub fn set_active_score(&mut self, scorer_id: i64) -> bool {
        match self.scores.iter().position(|s| s.scorer_id() == scorer_id) {
            Some(i) => {
                self.active_score = Some(i);
                true
            }
            None => false,
        }
    }

    /// Active scoring for `scorer_id`, created over the current recording
    /// range if this scorer has none yet.
    pub fn initialize_new_score(
        &mut self,
        scorer_id: i64,
        data_id: i64,
    ) -> std::result::Result<&mut PsgScoring, ScoringError> {
        let slot = match self.scores.iter().position(|s| s.scorer_id() == scorer_id) {
            Some(slot) => slot,
            None => {
                let scoring = PsgScoring::for_recording(scorer_id, data_id, self.time_range)?;
                self.scores.push(scoring);
                self.scores.len() - 1
            }
        };
        self.active_score = Some(slot);
        Ok(&mut self.scores[slot])
    }
}
