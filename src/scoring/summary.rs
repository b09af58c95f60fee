use chrono::{DateTime, Utc};
use serde::Serialize;

use super::psg::{RespiratoryEvent, RespiratoryEventType, SleepStage};
use super::EPOCH_DURATION_SECS;
use crate::store::constants::SECONDS_PER_HOUR;
use crate::store::time_range::{format_duration_hhmmss, TimeRange};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTotal {
    pub epochs: usize,
    pub seconds: f64,
    /// Share of all epochs, in percent.
    pub percent: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTotal {
    pub count: usize,
    pub seconds: f64,
}

/// Clinical summary of one scoring. Ratios over an empty recording are 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSummary {
    pub recording: TimeRange,
    pub epoch_count: usize,
    pub unscored_epochs: usize,
    pub total_sleep_secs: f64,
    pub sleep_efficiency_percent: f64,
    /// Zero-based epoch of the first sleep epoch of any stage.
    pub sleep_onset_epoch: Option<usize>,
    pub rem_onset_epoch: Option<usize>,
    pub wake: StageTotal,
    pub rem: StageTotal,
    pub n1: StageTotal,
    pub n2: StageTotal,
    pub n3: StageTotal,
    pub ahi: f64,
    pub rdi: f64,
    pub obstructive_apnea: EventTotal,
    pub mixed_apnea: EventTotal,
    pub central_apnea: EventTotal,
    pub hypopnea: EventTotal,
    pub rera: EventTotal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportRow {
    Section(String),
    Item { name: String, value: String },
}

impl ReportRow {
    fn item(name: &str, value: String) -> Self {
        ReportRow::Item {
            name: name.to_owned(),
            value,
        }
    }
}

impl ScoringSummary {
    pub fn compute(recording: TimeRange, stages: &[SleepStage], events: &[RespiratoryEvent]) -> Self {
        let epoch_count = stages.len();
        let mut counts = [0usize; 5];
        let mut unscored_epochs = 0;
        let mut sleep_onset_epoch = None;
        let mut rem_onset_epoch = None;
        for (epoch, stage) in stages.iter().enumerate() {
            let slot = match stage {
                SleepStage::Wake => 0,
                SleepStage::Rem => 1,
                SleepStage::N1 => 2,
                SleepStage::N2 => 3,
                SleepStage::N3 => 4,
                SleepStage::Unknown => {
                    unscored_epochs += 1;
                    continue;
                }
            };
            counts[slot] += 1;
            if *stage != SleepStage::Wake {
                sleep_onset_epoch.get_or_insert(epoch);
            }
            if *stage == SleepStage::Rem {
                rem_onset_epoch.get_or_insert(epoch);
            }
        }
        let stage_total = |epochs: usize| StageTotal {
            epochs,
            seconds: epochs as f64 * EPOCH_DURATION_SECS,
            percent: percent(epochs, epoch_count),
        };
        let sleep_epochs = epoch_count - counts[0] - unscored_epochs;

        let mut event_totals = [EventTotal::default(); 5];
        for event in events {
            let total = &mut event_totals[event.event_type as usize - 1];
            total.count += 1;
            total.seconds += event.time_range.duration();
        }
        let mut apnea_hypopnea = 0;
        let mut respiratory_disturbances = 0;
        for event_type in RespiratoryEventType::ALL {
            let count = event_totals[event_type as usize - 1].count;
            respiratory_disturbances += count;
            if event_type.is_apnea_or_hypopnea() {
                apnea_hypopnea += count;
            }
        }

        Self {
            recording,
            epoch_count,
            unscored_epochs,
            total_sleep_secs: sleep_epochs as f64 * EPOCH_DURATION_SECS,
            sleep_efficiency_percent: percent(sleep_epochs, epoch_count),
            sleep_onset_epoch,
            rem_onset_epoch,
            wake: stage_total(counts[0]),
            rem: stage_total(counts[1]),
            n1: stage_total(counts[2]),
            n2: stage_total(counts[3]),
            n3: stage_total(counts[4]),
            ahi: per_hour(apnea_hypopnea, recording.duration()),
            rdi: per_hour(respiratory_disturbances, recording.duration()),
            obstructive_apnea: event_totals[0],
            mixed_apnea: event_totals[1],
            central_apnea: event_totals[2],
            hypopnea: event_totals[3],
            rera: event_totals[4],
        }
    }

    pub fn sleep_onset_latency_secs(&self) -> Option<f64> {
        self.sleep_onset_epoch
            .map(|epoch| epoch as f64 * EPOCH_DURATION_SECS)
    }

    pub fn rem_onset_latency_secs(&self) -> Option<f64> {
        self.rem_onset_epoch
            .map(|epoch| epoch as f64 * EPOCH_DURATION_SECS)
    }

    pub fn event_total(&self, event_type: RespiratoryEventType) -> EventTotal {
        match event_type {
            RespiratoryEventType::ObstructiveApnea => self.obstructive_apnea,
            RespiratoryEventType::MixedApnea => self.mixed_apnea,
            RespiratoryEventType::CentralApnea => self.central_apnea,
            RespiratoryEventType::Hypopnea => self.hypopnea,
            RespiratoryEventType::Rera => self.rera,
        }
    }

    /// Labelled rows for the score report table.
    pub fn to_report_rows(&self) -> Vec<ReportRow> {
        let start = format_timestamp(self.recording.start_time);
        let end = format_timestamp(self.recording.end_time);
        let duration = self.recording.duration_hhmmss();
        let latency = |secs: Option<f64>| secs.map_or_else(|| "N/A".to_owned(), format_duration_hhmmss);
        let stage = |total: &StageTotal| {
            format!("{}/{:.1}%", format_duration_hhmmss(total.seconds), total.percent)
        };

        let mut rows = vec![
            ReportRow::Section("RECORDING".to_owned()),
            ReportRow::item("Recording Start Time", start.clone()),
            ReportRow::item("Recording End Time", end.clone()),
            ReportRow::item("Total Recording Time", duration.clone()),
            ReportRow::item("Lights Off Time", start),
            ReportRow::item("Lights On Time", end),
            ReportRow::item("Total Lights Off Time", duration),
            ReportRow::Section("STAGE".to_owned()),
            ReportRow::item("Total Sleep Time", format_duration_hhmmss(self.total_sleep_secs)),
            ReportRow::item("Sleep Efficiency", format!("{:.1}%", self.sleep_efficiency_percent)),
            ReportRow::item("Sleep Onset Latency", latency(self.sleep_onset_latency_secs())),
            ReportRow::item("REM Onset Latency", latency(self.rem_onset_latency_secs())),
            ReportRow::item("Total Wake (Time/%)", stage(&self.wake)),
            ReportRow::item("Total REM (Time/%)", stage(&self.rem)),
            ReportRow::item("Total N1 (Time/%)", stage(&self.n1)),
            ReportRow::item("Total N2 (Time/%)", stage(&self.n2)),
            ReportRow::item("Total N3 (Time/%)", stage(&self.n3)),
            ReportRow::Section("RESPIRATORY".to_owned()),
            ReportRow::item("AHI", format!("{:.1}", self.ahi)),
            ReportRow::item("RDI", format!("{:.1}", self.rdi)),
        ];
        for event_type in RespiratoryEventType::ALL {
            let total = self.event_total(event_type);
            rows.push(ReportRow::Item {
                name: format!("{} Count/Time", event_type.name()),
                value: format!("{}/{}", total.count, format_duration_hhmmss(total.seconds)),
            });
        }
        rows
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

fn per_hour(count: usize, duration_secs: f64) -> f64 {
    if duration_secs > 0.0 {
        count as f64 / duration_secs * SECONDS_PER_HOUR
    } else {
        0.0
    }
}

fn format_timestamp(secs: f64) -> String {
    if !secs.is_finite() {
        return secs.to_string();
    }
    let whole = secs.floor() as i64;
    let nanos = (((secs - whole as f64) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(whole, nanos)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}
