use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::filter::FilterKind;

/// Lead-in a notch filter needs before its output is trusted, in seconds.
pub const NOTCH_SETTLING_SECS: f64 = 1.5;
/// Settling factor (seconds x Hz) for the low-frequency (high-pass) filter.
pub const LOW_FILTER_SETTLING_FACTOR: f64 = 0.6;
/// Settling factor (seconds x Hz) for the high-frequency (low-pass) filter.
pub const HIGH_FILTER_SETTLING_FACTOR: f64 = 7.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    #[default]
    Trend,
    Step,
    #[serde(rename = "Step & Label")]
    StepAndLabel,
}

/// Mains notch selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotchSetting {
    #[default]
    None,
    #[serde(rename = "50 Hz")]
    Hz50,
    #[serde(rename = "60 Hz")]
    Hz60,
}

impl NotchSetting {
    pub fn frequency_hz(self) -> Option<f64> {
        match self {
            NotchSetting::None => None,
            NotchSetting::Hz50 => Some(50.0),
            NotchSetting::Hz60 => Some(60.0),
        }
    }
}

/// Per-channel display settings read by the query pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelPreferences {
    pub chart_type: ChartType,
    pub visible: bool,
    pub color: String,
    pub is_auto_scaled: bool,
    pub range: Option<[f64; 2]>,
    pub polarity: bool,
    /// Cutoff of the filter that removes slow drift (a high-pass).
    #[serde(with = "cutoff")]
    pub low_frequency_filter: Option<f64>,
    /// Cutoff of the filter that removes fast noise (a low-pass).
    #[serde(with = "cutoff")]
    pub high_frequency_filter: Option<f64>,
    pub notch_filter: NotchSetting,
    pub reference_channels: Vec<String>,
    pub reference_lines: Vec<f64>,
}

impl Default for ChannelPreferences {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Trend,
            visible: true,
            color: "#8884d8".to_owned(),
            is_auto_scaled: false,
            range: None,
            polarity: false,
            low_frequency_filter: None,
            high_frequency_filter: None,
            notch_filter: NotchSetting::None,
            reference_channels: Vec::new(),
            reference_lines: Vec::new(),
        }
    }
}

impl ChannelPreferences {
    /// Filters in the order they are applied: notch, high-pass, low-pass.
    pub fn filter_kinds(&self) -> Vec<FilterKind> {
        let mut kinds = Vec::new();
        if let Some(freq_hz) = self.notch_filter.frequency_hz() {
            kinds.push(FilterKind::Notch { freq_hz });
        }
        if let Some(cutoff_hz) = self.low_frequency_filter {
            kinds.push(FilterKind::Highpass { cutoff_hz });
        }
        if let Some(cutoff_hz) = self.high_frequency_filter {
            kinds.push(FilterKind::Lowpass { cutoff_hz });
        }
        kinds
    }

    /// Extra history to fetch ahead of a window so the filters have settled.
    pub fn settling_time_secs(&self) -> f64 {
        let mut extra: f64 = 0.0;
        if self.notch_filter != NotchSetting::None {
            extra = extra.max(NOTCH_SETTLING_SECS);
        }
        if let Some(hz) = self.low_frequency_filter.filter(|hz| *hz > 0.0) {
            extra = extra.max(LOW_FILTER_SETTLING_FACTOR / hz);
        }
        if let Some(hz) = self.high_frequency_filter.filter(|hz| *hz > 0.0) {
            extra = extra.max(HIGH_FILTER_SETTLING_FACTOR / hz);
        }
        extra
    }
}

/// Whole-plot display settings plus the per-channel table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotPreferences {
    pub background_color: String,
    pub show_grid: bool,
    pub show_channel_label: bool,
    pub display_interval: f64,
    pub watermark: String,
    pub playing_speed: f64,
    pub channel_order: Vec<String>,
    pub respiratory_channel: String,
    pub channels: HashMap<String, ChannelPreferences>,
}

impl Default for PlotPreferences {
    fn default() -> Self {
        Self {
            background_color: "#FFFFFF".to_owned(),
            show_grid: true,
            show_channel_label: true,
            display_interval: 30.0,
            watermark: String::new(),
            playing_speed: 1.0,
            channel_order: Vec::new(),
            respiratory_channel: String::new(),
            channels: HashMap::new(),
        }
    }
}

impl PlotPreferences {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }
}

/// Read side of the preference store, as seen by the query pipeline.
pub trait PreferenceSource {
    fn channel_preferences(&self, channel_name: &str) -> ChannelPreferences;

    /// Visible channels among `channel_names`, in display order.
    fn visible_ordered_channels(&self, channel_names: &[String]) -> Vec<String>;

    /// Called once per channel with the data-type plot range when no display
    /// range has been chosen yet.
    fn seed_range(&mut self, channel_name: &str, range: [f64; 2]);
}

impl PreferenceSource for PlotPreferences {
    fn channel_preferences(&self, channel_name: &str) -> ChannelPreferences {
        self.channels.get(channel_name).cloned().unwrap_or_default()
    }

    fn visible_ordered_channels(&self, channel_names: &[String]) -> Vec<String> {
        let is_visible = |name: &String| {
            self.channels
                .get(name.as_str())
                .map(|prefs| prefs.visible)
                .unwrap_or(true)
        };
        let mut ordered: Vec<String> = self
            .channel_order
            .iter()
            .filter(|name| channel_names.contains(name) && is_visible(name))
            .cloned()
            .collect();
        for name in channel_names {
            if !self.channel_order.contains(name) && is_visible(name) {
                ordered.push(name.clone());
            }
        }
        ordered
    }

    fn seed_range(&mut self, channel_name: &str, range: [f64; 2]) {
        if !self.channel_order.iter().any(|name| name == channel_name) {
            self.channel_order.push(channel_name.to_owned());
        }
        let prefs = self.channels.entry(channel_name.to_owned()).or_default();
        if prefs.range.is_none() {
            prefs.range = Some(range);
        }
    }
}

// Cutoffs travel either as numbers, numeric strings or the "No Filter" label.
mod cutoff {
    use super::*;

    const NO_FILTER: &str = "No Filter";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(hz) => serializer.serialize_f64(*hz),
            None => serializer.serialize_str(NO_FILTER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let wire = Option::<Wire>::deserialize(deserializer)?;
        Ok(match wire {
            Some(Wire::Number(hz)) => Some(hz),
            Some(Wire::Text(text)) => text.trim().parse::<f64>().ok(),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settling_time_takes_the_longest_filter() {
        let mut prefs = ChannelPreferences::default();
        assert_eq!(prefs.settling_time_secs(), 0.0);
        prefs.notch_filter = NotchSetting::Hz60;
        assert_eq!(prefs.settling_time_secs(), 1.5);
        prefs.low_frequency_filter = Some(0.3);
        assert!((prefs.settling_time_secs() - 2.0).abs() < 1e-12);
        prefs.high_frequency_filter = Some(1.0);
        assert_eq!(prefs.settling_time_secs(), 7.5);
    }

    #[test]
    fn filter_kinds_follow_fixed_order() {
        let prefs = ChannelPreferences {
            low_frequency_filter: Some(0.5),
            high_frequency_filter: Some(35.0),
            notch_filter: NotchSetting::Hz50,
            ..Default::default()
        };
        assert_eq!(
            prefs.filter_kinds(),
            vec![
                FilterKind::Notch { freq_hz: 50.0 },
                FilterKind::Highpass { cutoff_hz: 0.5 },
                FilterKind::Lowpass { cutoff_hz: 35.0 },
            ]
        );
    }

    #[test]
    fn parses_wire_labels() {
        let json = r#"{
            "lowFrequencyFilter": "0.3",
            "highFrequencyFilter": "No Filter",
            "notchFilter": "60 Hz",
            "chartType": "Step & Label",
            "referenceChannels": ["M1", "M2"]
        }"#;
        let prefs: ChannelPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.low_frequency_filter, Some(0.3));
        assert_eq!(prefs.high_frequency_filter, None);
        assert_eq!(prefs.notch_filter, NotchSetting::Hz60);
        assert_eq!(prefs.chart_type, ChartType::StepAndLabel);
        assert!(prefs.visible);
        assert_eq!(prefs.reference_channels, vec!["M1", "M2"]);
    }

    #[test]
    fn loads_plot_preferences() {
        let plot = PlotPreferences::from_json_str(
            r#"{"displayInterval": 60, "channelOrder": ["SpO2"], "channels": {"SpO2": {"visible": false}}}"#,
        )
        .unwrap();
        assert_eq!(plot.display_interval, 60.0);
        assert!(plot.show_grid);
        assert!(!plot.channel_preferences("SpO2").visible);
        assert!(PlotPreferences::from_json_str("[1, 2]").is_err());
        assert!(PlotPreferences::from_json_file("/nonexistent/prefs.json").is_err());
    }

    #[test]
    fn visible_channels_respect_order_then_arrival() {
        let mut plot = PlotPreferences {
            channel_order: vec!["C4-M1".into(), "C3-M2".into()],
            ..Default::default()
        };
        plot.channels.insert(
            "Chin".into(),
            ChannelPreferences {
                visible: false,
                ..Default::default()
            },
        );
        let names: Vec<String> = ["C3-M2", "Chin", "SpO2", "C4-M1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            plot.visible_ordered_channels(&names),
            vec!["C4-M1", "C3-M2", "SpO2"]
        );
    }

    #[test]
    fn seed_range_only_fills_missing_range() {
        let mut plot = PlotPreferences::default();
        plot.seed_range("SpO2", [0.0, 256.0]);
        plot.seed_range("SpO2", [-1.0, 1.0]);
        assert_eq!(plot.channel_preferences("SpO2").range, Some([0.0, 256.0]));
        assert_eq!(plot.channel_order, vec!["SpO2"]);
    }
}
