use serde::{Deserialize, Serialize};

/// One stored sample: a numeric code or, for event/label channels, a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    Text(String),
}

impl SampleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SampleValue::Number(v) => Some(*v),
            SampleValue::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SampleValue::Text(_))
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        SampleValue::Number(value)
    }
}

impl From<&str> for SampleValue {
    fn from(value: &str) -> Self {
        SampleValue::Text(value.to_owned())
    }
}

impl From<String> for SampleValue {
    fn from(value: String) -> Self {
        SampleValue::Text(value)
    }
}

/// Contiguous run of samples handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    pub times: Vec<f64>,
    pub values: Vec<SampleValue>,
    pub plot_range: [f64; 2],
    pub is_evenly_spaced: bool,
    pub sampling_time: f64,
    pub has_string_values: bool,
}

impl SegmentView {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric payload, or `None` if any sample is a label.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        self.values.iter().map(SampleValue::as_number).collect()
    }

    pub fn is_filterable(&self) -> bool {
        self.is_evenly_spaced && !self.has_string_values && self.len() > 1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelView {
    pub channel_name: String,
    pub data: Vec<SegmentView>,
}

impl ChannelView {
    pub fn sample_count(&self) -> usize {
        self.data.iter().map(SegmentView::len).sum()
    }
}
