use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::ScoringError;
use super::history::History;
use super::summary::ScoringSummary;
use super::{EPOCH_DURATION_SECS, MAX_HISTORY_LENGTH};
use crate::store::constants::{RESPIRATORY_EVENT_CHANNEL, SLEEP_STAGE_CHANNEL};
use crate::store::raw_values::{DataType, RawValues};
use crate::store::source::DataBatchItem;
use crate::store::time_range::TimeRange;
use crate::waveform::SampleValue;

/// Sleep stage of one 30 s epoch. Travels as its integer code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SleepStage {
    #[default]
    Unknown,
    Wake,
    Rem,
    N1,
    N2,
    N3,
}

impl From<i32> for SleepStage {
    fn from(code: i32) -> Self {
        match code {
            0 => SleepStage::Wake,
            1 => SleepStage::Rem,
            2 => SleepStage::N1,
            3 => SleepStage::N2,
            4 => SleepStage::N3,
            _ => SleepStage::Unknown,
        }
    }
}

impl From<SleepStage> for i32 {
    fn from(stage: SleepStage) -> Self {
        match stage {
            SleepStage::Unknown => -1,
            SleepStage::Wake => 0,
            SleepStage::Rem => 1,
            SleepStage::N1 => 2,
            SleepStage::N2 => 3,
            SleepStage::N3 => 4,
        }
    }
}

impl SleepStage {
    pub fn name(self) -> &'static str {
        match self {
            SleepStage::Unknown => "Unknown",
            SleepStage::Wake => "Wake",
            SleepStage::Rem => "REM",
            SleepStage::N1 => "Stage 1",
            SleepStage::N2 => "Stage 2",
            SleepStage::N3 => "Stage 3",
        }
    }
}

/// Short hypnogram label: `W`, `R`, `1`, `2`, `3`, or `U`.
pub fn stage_label(stage: SleepStage) -> &'static str {
    match stage {
        SleepStage::Unknown => "U",
        SleepStage::Wake => "W",
        SleepStage::Rem => "R",
        SleepStage::N1 => "1",
        SleepStage::N2 => "2",
        SleepStage::N3 => "3",
    }
}

pub fn stage_from_label(label: &str) -> SleepStage {
    match label {
        "W" => SleepStage::Wake,
        "R" => SleepStage::Rem,
        "1" => SleepStage::N1,
        "2" => SleepStage::N2,
        "3" => SleepStage::N3,
        _ => SleepStage::Unknown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RespiratoryEventType {
    ObstructiveApnea = 1,
    MixedApnea = 2,
    CentralApnea = 3,
    Hypopnea = 4,
    Rera = 5,
}

impl RespiratoryEventType {
    pub const ALL: [RespiratoryEventType; 5] = [
        RespiratoryEventType::ObstructiveApnea,
        RespiratoryEventType::MixedApnea,
        RespiratoryEventType::CentralApnea,
        RespiratoryEventType::Hypopnea,
        RespiratoryEventType::Rera,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|event_type| *event_type as i32 == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            RespiratoryEventType::ObstructiveApnea => "Obstructive Apnea",
            RespiratoryEventType::MixedApnea => "Mixed Apnea",
            RespiratoryEventType::CentralApnea => "Central Apnea",
            RespiratoryEventType::Hypopnea => "Hypopnea",
            RespiratoryEventType::Rera => "RERA",
        }
    }

    /// Whether the event counts towards the apnea-hypopnea index.
    pub fn is_apnea_or_hypopnea(self) -> bool {
        self != RespiratoryEventType::Rera
    }
}

impl TryFrom<i32> for RespiratoryEventType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown respiratory event type {code}"))
    }
}

impl From<RespiratoryEventType> for i32 {
    fn from(event_type: RespiratoryEventType) -> Self {
        event_type as i32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespiratoryEvent {
    pub time_range: TimeRange,
    pub event_type: RespiratoryEventType,
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    epoch: usize,
    stages: Vec<SleepStage>,
    respiratory_events: Vec<RespiratoryEvent>,
}

/// One scorer's annotations for a recording: a stage per epoch plus a
/// sorted list of non-overlapping respiratory events, with undo/redo.
#[derive(Clone, Debug)]
pub struct PsgScoring {
    scorer_id: i64,
    data_id: i64,
    time_range: TimeRange,
    stages: Vec<SleepStage>,
    respiratory_events: Vec<RespiratoryEvent>,
    next_event_id: u64,
    history: History<Snapshot>,
    is_dirty: bool,
}

impl PsgScoring {
    pub fn new(scorer_id: i64, data_id: i64, time_range: TimeRange) -> Self {
        let epoch_count = epoch_count(&time_range);
        let mut scoring = Self {
            scorer_id,
            data_id,
            time_range,
            stages: vec![SleepStage::Unknown; epoch_count],
            respiratory_events: Vec::new(),
            next_event_id: 0,
            history: History::new(MAX_HISTORY_LENGTH),
            is_dirty: false,
        };
        scoring.history.reset(scoring.snapshot(1));
        info!("new scoring for scorer {scorer_id}: {epoch_count} epochs");
        scoring
    }

    /// Builds a scoring for `time_range`, failing when it is not known yet.
    pub fn for_recording(
        scorer_id: i64,
        data_id: i64,
        time_range: Option<TimeRange>,
    ) -> Result<Self, ScoringError> {
        let time_range = time_range.ok_or(ScoringError::NoRecordingRange)?;
        Ok(Self::new(scorer_id, data_id, time_range))
    }

    pub fn scorer_id(&self) -> i64 {
        self.scorer_id
    }

    pub fn data_id(&self) -> i64 {
        self.data_id
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn epoch_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Marks the current state as persisted.
    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }

    /// Loads one persisted chunk as produced by [`get_data_chunks`]. Resets
    /// the undo history.
    ///
    /// [`get_data_chunks`]: PsgScoring::get_data_chunks
    pub fn add_data_chunk(&mut self, item: &DataBatchItem) {
        let epoch = self.current_epoch();
        match item.channel_name.as_str() {
            SLEEP_STAGE_CHANNEL => {
                let mut stages: Vec<SleepStage> = item
                    .values
                    .data
                    .iter()
                    .map(|value| match value {
                        SampleValue::Number(code) => SleepStage::from(code.round() as i32),
                        SampleValue::Text(label) => stage_from_label(label),
                    })
                    .collect();
                stages.resize(self.stages.len(), SleepStage::Unknown);
                self.stages = stages;
            }
            RESPIRATORY_EVENT_CHANNEL => {
                let data = &item.values.data;
                for (i, value) in data.iter().enumerate() {
                    let Some(code) = value.as_number().filter(|code| *code > 0.0) else {
                        continue;
                    };
                    let (Some(start), Some(end)) = (item.times.get(i), item.times.get(i + 1)) else {
                        continue;
                    };
                    let Some(event_type) = RespiratoryEventType::from_code(code.round() as i32) else {
                        debug!("skipping unknown respiratory event type {code}");
                        continue;
                    };
                    if self.insert_event(TimeRange::new(*start, *end), event_type).is_none() {
                        debug!("skipping overlapping stored event at {start}");
                    }
                }
            }
            other => {
                debug!("scoring ignores channel {other}");
                return;
            }
        }
        self.history.reset(self.snapshot(epoch));
        self.is_dirty = false;
        info!(
            "loaded {} for scorer {} ({} events)",
            item.channel_name,
            self.scorer_id,
            self.respiratory_events.len()
        );
    }

    /// Sets the stage of a 1-based `epoch`. Out-of-range epochs are ignored.
    pub fn update_stage(&mut self, epoch: usize, stage: SleepStage) -> bool {
        if epoch == 0 || epoch > self.stages.len() {
            return false;
        }
        self.stages[epoch - 1] = stage;
        self.record(epoch);
        true
    }

    pub fn stage_at(&self, epoch: usize) -> Option<SleepStage> {
        epoch.checked_sub(1).and_then(|index| self.stages.get(index)).copied()
    }

    /// Stages from 1-based `start_epoch`; `count` of `None` runs to the end.
    /// A start before epoch 1 shortens the run accordingly.
    pub fn get_stages(&self, start_epoch: i64, count: Option<usize>) -> &[SleepStage] {
        let mut count = count.map(|c| c as i64);
        let mut start_epoch = start_epoch;
        if start_epoch < 1 {
            count = count.map(|c| c + start_epoch - 1);
            start_epoch = 1;
        }
        let start = ((start_epoch - 1) as usize).min(self.stages.len());
        let end = match count {
            Some(c) => start + c.max(0) as usize,
            None => self.stages.len(),
        };
        &self.stages[start..end.min(self.stages.len())]
    }

    pub fn stages(&self) -> &[SleepStage] {
        &self.stages
    }

    pub fn respiratory_events(&self) -> &[RespiratoryEvent] {
        &self.respiratory_events
    }

    /// Events intersecting `window`, with their positions in the event list.
    pub fn get_respiratory_events(&self, window: &TimeRange) -> Vec<(usize, RespiratoryEvent)> {
        self.respiratory_events
            .iter()
            .enumerate()
            .take_while(|(_, event)| event.time_range.start_time <= window.end_time)
            .filter(|(_, event)| event.time_range.intersects(window))
            .map(|(index, event)| (index, *event))
            .collect()
    }

    /// Adds an event unless it overlaps one already scored.
    pub fn add_respiratory_event(
        &mut self,
        time_range: TimeRange,
        event_type: RespiratoryEventType,
    ) -> bool {
        if self.insert_event(time_range, event_type).is_none() {
            return false;
        }
        self.record(self.epoch_of(time_range.start_time));
        true
    }

    /// Moves and/or retypes the event at `index`. The new range must stay
    /// clear of its neighbours.
    pub fn update_respiratory_event(
        &mut self,
        index: usize,
        time_range: Option<TimeRange>,
        event_type: Option<RespiratoryEventType>,
    ) -> bool {
        if index >= self.respiratory_events.len() {
            return false;
        }
        if let Some(range) = time_range {
            if !(range.end_time > range.start_time) {
                return false;
            }
            if index > 0 && range.start_time < self.respiratory_events[index - 1].time_range.end_time {
                return false;
            }
            if self
                .respiratory_events
                .get(index + 1)
                .is_some_and(|next| range.end_time > next.time_range.start_time)
            {
                return false;
            }
        }
        let event = &mut self.respiratory_events[index];
        if let Some(range) = time_range {
            event.time_range = range;
        }
        if let Some(event_type) = event_type {
            event.event_type = event_type;
        }
        let start = event.time_range.start_time;
        self.record(self.epoch_of(start));
        true
    }

    pub fn delete_respiratory_event(&mut self, index: usize) -> bool {
        if index >= self.respiratory_events.len() {
            return false;
        }
        let removed = self.respiratory_events.remove(index);
        self.record(self.epoch_of(removed.time_range.start_time));
        true
    }

    /// Removes every event and resets every stage to unknown.
    pub fn clear_all_events(&mut self) {
        self.respiratory_events.clear();
        self.stages.fill(SleepStage::Unknown);
        self.record(1);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous state; returns the epoch the undone edit touched.
    pub fn undo(&mut self) -> Option<usize> {
        let (restored, undone) = self.history.undo()?;
        let epoch = undone.epoch;
        let restored = restored.clone();
        self.restore(restored);
        Some(epoch)
    }

    /// Re-applies the next state; returns the epoch that edit touched.
    pub fn redo(&mut self) -> Option<usize> {
        let restored = self.history.redo()?.clone();
        let epoch = restored.epoch;
        self.restore(restored);
        Some(epoch)
    }

    /// Persistable form: one stage chunk (`[start, epoch length]` times) and
    /// one event chunk (zero-padded start/end pairs).
    pub fn get_data_chunks(&self) -> Vec<DataBatchItem> {
        let epoch_starts: Vec<f64> = (0..self.stages.len())
            .map(|i| self.time_range.start_time + i as f64 * EPOCH_DURATION_SECS)
            .collect();
        let stages = DataBatchItem::new(
            SLEEP_STAGE_CHANNEL,
            epoch_starts,
            RawValues::numeric(
                DataType::Signed16,
                self.stages.iter().map(|stage| i32::from(*stage) as f64),
            ),
        );

        let mut times = vec![self.time_range.start_time];
        let mut codes = vec![0.0];
        for event in &self.respiratory_events {
            times.push(event.time_range.start_time);
            times.push(event.time_range.end_time);
            codes.push(i32::from(event.event_type) as f64);
            codes.push(0.0);
        }
        times.push(self.time_range.end_time);
        codes.push(0.0);
        let mut events = DataBatchItem::new(
            RESPIRATORY_EVENT_CHANNEL,
            times,
            RawValues::numeric(DataType::Signed16, codes),
        );

        // A zero-length recording has no epochs to send.
        let mut chunks: Vec<DataBatchItem> = [stages, events]
            .into_iter()
            .filter(|item| !item.values.is_empty())
            .collect();
        for item in &mut chunks {
            item.sent_by_user_id = Some(self.scorer_id);
            item.data_id = Some(self.data_id);
        }
        chunks
    }

    pub fn get_summary(&self) -> ScoringSummary {
        ScoringSummary::compute(self.time_range, &self.stages, &self.respiratory_events)
    }

    fn insert_event(&mut self, time_range: TimeRange, event_type: RespiratoryEventType) -> Option<usize> {
        if !(time_range.end_time > time_range.start_time) {
            return None;
        }
        let index = self
            .respiratory_events
            .partition_point(|event| event.time_range.start_time <= time_range.start_time);
        if index > 0 && self.respiratory_events[index - 1].time_range.end_time > time_range.start_time {
            return None;
        }
        if self
            .respiratory_events
            .get(index)
            .is_some_and(|next| time_range.end_time > next.time_range.start_time)
        {
            return None;
        }
        self.respiratory_events.insert(
            index,
            RespiratoryEvent {
                time_range,
                event_type,
                id: self.next_event_id,
            },
        );
        self.next_event_id += 1;
        Some(index)
    }

    /// 1-based epoch containing `time`, clamped to the recording.
    fn epoch_of(&self, time: f64) -> usize {
        let offset = (time - self.time_range.start_time) / EPOCH_DURATION_SECS;
        let epoch = if offset.is_finite() && offset > 0.0 {
            offset.floor() as usize + 1
        } else {
            1
        };
        epoch.min(self.stages.len().max(1))
    }

    fn current_epoch(&self) -> usize {
        self.history.current().map_or(1, |snapshot| snapshot.epoch)
    }

    fn snapshot(&self, epoch: usize) -> Snapshot {
        Snapshot {
            epoch,
            stages: self.stages.clone(),
            respiratory_events: self.respiratory_events.clone(),
        }
    }

    fn record(&mut self, epoch: usize) {
        let snapshot = self.snapshot(epoch);
        self.history.push(snapshot);
        self.is_dirty = true;
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.stages = snapshot.stages;
        self.respiratory_events = snapshot.respiratory_events;
        self.is_dirty = true;
    }
}

fn epoch_count(time_range: &TimeRange) -> usize {
    let epochs = (time_range.duration() / EPOCH_DURATION_SECS).ceil();
    if epochs.is_finite() && epochs > 0.0 {
        epochs as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const START: f64 = 1_000.0;

    fn scoring(epochs: usize) -> PsgScoring {
        PsgScoring::new(7, 11, TimeRange::new(START, START + epochs as f64 * 30.0))
    }

    fn range(start: f64, end: f64) -> TimeRange {
        TimeRange::new(START + start, START + end)
    }

    fn assert_sorted_and_disjoint(events: &[RespiratoryEvent]) {
        for pair in events.windows(2) {
            assert!(pair[0].time_range.start_time <= pair[1].time_range.start_time);
            assert!(pair[0].time_range.end_time <= pair[1].time_range.start_time);
        }
    }

    #[test]
    fn new_scoring_is_unscored_and_clean() {
        let scores = PsgScoring::new(1, 2, TimeRange::new(0.0, 95.0));
        assert_eq!(scores.epoch_count(), 4);
        assert!(scores.stages().iter().all(|s| *s == SleepStage::Unknown));
        assert!(!scores.is_dirty());
        assert!(!scores.can_undo());
        assert!(matches!(
            PsgScoring::for_recording(1, 2, None),
            Err(ScoringError::NoRecordingRange)
        ));
    }

    #[test]
    fn stage_updates_use_one_based_epochs() {
        let mut scores = scoring(10);
        assert!(scores.update_stage(1, SleepStage::Wake));
        assert!(scores.update_stage(10, SleepStage::N2));
        assert!(!scores.update_stage(0, SleepStage::N1));
        assert!(!scores.update_stage(11, SleepStage::N1));
        assert_eq!(scores.stage_at(1), Some(SleepStage::Wake));
        assert_eq!(scores.stage_at(10), Some(SleepStage::N2));
        assert!(scores.is_dirty());
        assert_eq!(scores.get_stages(9, Some(2)), &[SleepStage::Unknown, SleepStage::N2]);
        assert_eq!(scores.get_stages(0, Some(2)), &[SleepStage::Wake]);
        assert_eq!(scores.get_stages(10, None), &[SleepStage::N2]);
        assert_eq!(scores.get_stages(8, Some(10)).len(), 3);
    }

    #[test]
    fn overlapping_events_are_rejected() {
        let mut scores = scoring(10);
        assert!(scores.add_respiratory_event(range(40.0, 55.0), RespiratoryEventType::Hypopnea));
        assert!(!scores.add_respiratory_event(range(50.0, 60.0), RespiratoryEventType::Hypopnea));
        assert!(!scores.add_respiratory_event(range(30.0, 41.0), RespiratoryEventType::Hypopnea));
        assert!(!scores.add_respiratory_event(range(45.0, 50.0), RespiratoryEventType::Hypopnea));
        assert!(!scores.add_respiratory_event(range(40.0, 55.0), RespiratoryEventType::Rera));
        assert!(!scores.add_respiratory_event(range(70.0, 70.0), RespiratoryEventType::Rera));
        assert!(scores.add_respiratory_event(range(55.0, 60.0), RespiratoryEventType::Rera));
        assert!(scores.add_respiratory_event(range(10.0, 20.0), RespiratoryEventType::CentralApnea));
        let starts: Vec<f64> = scores
            .respiratory_events()
            .iter()
            .map(|e| e.time_range.start_time - START)
            .collect();
        assert_eq!(starts, vec![10.0, 40.0, 55.0]);
    }

    #[test]
    fn random_insertions_keep_events_disjoint() {
        let mut rng = rand::thread_rng();
        let mut scores = scoring(120);
        for _ in 0..500 {
            let start = rng.gen_range(0.0..3600.0);
            let length = rng.gen_range(1.0..60.0);
            let before = scores.respiratory_events().len();
            let added = scores.add_respiratory_event(range(start, start + length), RespiratoryEventType::ObstructiveApnea);
            assert_eq!(scores.respiratory_events().len(), before + usize::from(added));
            assert_sorted_and_disjoint(scores.respiratory_events());
        }
    }

    #[test]
    fn update_event_checks_neighbours() {
        let mut scores = scoring(10);
        scores.add_respiratory_event(range(10.0, 20.0), RespiratoryEventType::Hypopnea);
        scores.add_respiratory_event(range(40.0, 50.0), RespiratoryEventType::Hypopnea);
        scores.add_respiratory_event(range(70.0, 80.0), RespiratoryEventType::Hypopnea);
        assert!(!scores.update_respiratory_event(1, Some(range(15.0, 45.0)), None));
        assert!(!scores.update_respiratory_event(1, Some(range(45.0, 75.0)), None));
        assert!(!scores.update_respiratory_event(3, None, Some(RespiratoryEventType::Rera)));
        assert!(scores.update_respiratory_event(1, Some(range(20.0, 70.0)), Some(RespiratoryEventType::MixedApnea)));
        let moved = scores.respiratory_events()[1];
        assert_eq!(moved.time_range, range(20.0, 70.0));
        assert_eq!(moved.event_type, RespiratoryEventType::MixedApnea);
        assert_eq!(scores.undo(), Some(1));
        assert_eq!(scores.respiratory_events()[1].time_range, range(40.0, 50.0));
    }

    #[test]
    fn delete_and_window_queries() {
        let mut scores = scoring(10);
        scores.add_respiratory_event(range(10.0, 20.0), RespiratoryEventType::Hypopnea);
        scores.add_respiratory_event(range(40.0, 50.0), RespiratoryEventType::Rera);
        scores.add_respiratory_event(range(100.0, 110.0), RespiratoryEventType::CentralApnea);
        let hits = scores.get_respiratory_events(&range(15.0, 45.0));
        assert_eq!(hits.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1]);
        assert!(scores.delete_respiratory_event(0));
        assert!(!scores.delete_respiratory_event(5));
        assert_eq!(scores.respiratory_events().len(), 2);
        assert_eq!(scores.get_respiratory_events(&range(100.0, 100.0)).len(), 1);
    }

    #[test]
    fn undo_redo_round_trip_and_epochs() {
        let mut scores = scoring(10);
        scores.update_stage(3, SleepStage::N1);
        scores.update_stage(4, SleepStage::N2);
        scores.add_respiratory_event(range(200.0, 215.0), RespiratoryEventType::Hypopnea);
        let edited_stages = scores.stages().to_vec();
        let edited_events = scores.respiratory_events().to_vec();

        assert_eq!(scores.undo(), Some(7));
        assert!(scores.respiratory_events().is_empty());
        assert_eq!(scores.undo(), Some(4));
        assert_eq!(scores.stage_at(4), Some(SleepStage::Unknown));
        assert_eq!(scores.undo(), Some(3));
        assert!(scores.stages().iter().all(|s| *s == SleepStage::Unknown));
        assert_eq!(scores.undo(), None);

        assert_eq!(scores.redo(), Some(3));
        assert_eq!(scores.redo(), Some(4));
        assert_eq!(scores.redo(), Some(7));
        assert_eq!(scores.redo(), None);
        assert_eq!(scores.stages(), edited_stages.as_slice());
        assert_eq!(scores.respiratory_events(), edited_events.as_slice());
    }

    #[test]
    fn edit_after_undo_drops_redo() {
        let mut scores = scoring(10);
        scores.update_stage(1, SleepStage::Wake);
        scores.update_stage(2, SleepStage::Wake);
        scores.undo();
        scores.update_stage(5, SleepStage::Rem);
        assert!(!scores.can_redo());
        assert_eq!(scores.stage_at(2), Some(SleepStage::Unknown));
    }

    #[test]
    fn history_keeps_the_latest_twenty_states() {
        let mut scores = scoring(40);
        for epoch in 1..=30 {
            scores.update_stage(epoch, SleepStage::N2);
        }
        let mut undone = 0;
        while scores.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY_LENGTH - 1);
        assert_eq!(scores.get_stages(1, Some(11)), &[SleepStage::N2; 11]);
        assert_eq!(scores.stage_at(12), Some(SleepStage::Unknown));
    }

    #[test]
    fn clear_all_resets_stages_and_events() {
        let mut scores = scoring(4);
        scores.update_stage(2, SleepStage::Rem);
        scores.add_respiratory_event(range(5.0, 15.0), RespiratoryEventType::Hypopnea);
        scores.clear_all_events();
        assert!(scores.respiratory_events().is_empty());
        assert!(scores.stages().iter().all(|s| *s == SleepStage::Unknown));
        assert_eq!(scores.undo(), Some(1));
        assert_eq!(scores.respiratory_events().len(), 1);
    }

    #[test]
    fn data_chunks_round_trip() {
        let mut scores = scoring(6);
        scores.update_stage(1, SleepStage::Wake);
        scores.update_stage(2, SleepStage::N1);
        scores.update_stage(3, SleepStage::N2);
        scores.update_stage(5, SleepStage::Rem);
        scores.add_respiratory_event(range(0.0, 12.0), RespiratoryEventType::ObstructiveApnea);
        scores.add_respiratory_event(range(12.0, 30.0), RespiratoryEventType::Rera);
        scores.add_respiratory_event(range(95.5, 110.0), RespiratoryEventType::Hypopnea);

        let chunks = scores.get_data_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0].times,
            vec![START, START + 30.0, START + 60.0, START + 90.0, START + 120.0, START + 150.0]
        );
        assert_eq!(chunks[1].times.len(), 2 + 2 * 3);
        assert!(chunks.iter().all(|c| c.scorer_id() == Some(7) && c.data_id == Some(11)));

        let mut loaded = scoring(6);
        for chunk in &chunks {
            let mut chunk = chunk.clone();
            chunk.normalize().unwrap();
            loaded.add_data_chunk(&chunk);
        }
        assert_eq!(loaded.stages(), scores.stages());
        let shape = |s: &PsgScoring| {
            s.respiratory_events()
                .iter()
                .map(|e| (e.time_range, e.event_type))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&loaded), shape(&scores));
        assert!(!loaded.is_dirty());
        assert!(!loaded.can_undo());
    }

    #[test]
    fn stage_chunk_accepts_labels() {
        let mut scores = scoring(3);
        let item = DataBatchItem::new(
            SLEEP_STAGE_CHANNEL,
            vec![START, 30.0],
            RawValues::new(DataType::Text, 0.0, 1.0, vec!["W".into(), "R".into(), "3".into()]),
        );
        scores.add_data_chunk(&item);
        assert_eq!(scores.stages(), &[SleepStage::Wake, SleepStage::Rem, SleepStage::N3]);
    }

    #[test]
    fn labels_and_codes() {
        for stage in [
            SleepStage::Unknown,
            SleepStage::Wake,
            SleepStage::Rem,
            SleepStage::N1,
            SleepStage::N2,
            SleepStage::N3,
        ] {
            assert_eq!(stage_from_label(stage_label(stage)), stage);
            assert_eq!(SleepStage::from(i32::from(stage)), stage);
        }
        assert_eq!(stage_from_label("x"), SleepStage::Unknown);
        assert_eq!(RespiratoryEventType::from_code(5), Some(RespiratoryEventType::Rera));
        assert_eq!(RespiratoryEventType::from_code(0), None);
        assert_eq!(serde_json::to_string(&SleepStage::Unknown).unwrap(), "-1");
    }

    #[test]
    fn summary_reflects_edits() {
        let mut scores = scoring(120);
        for epoch in 1..=120 {
            scores.update_stage(epoch, if epoch <= 20 { SleepStage::Wake } else { SleepStage::N2 });
        }
        scores.add_respiratory_event(range(900.0, 915.0), RespiratoryEventType::Hypopnea);
        let summary = scores.get_summary();
        assert_eq!(summary.sleep_onset_epoch, Some(20));
        assert!((summary.ahi - 1.0).abs() < 1e-9);
    }
}
