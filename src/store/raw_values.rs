use serde::{Deserialize, Serialize};

use crate::waveform::SampleValue;

/// Storage type code of a sample payload. Travels as an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum DataType {
    Unsigned8,
    Signed8,
    Unsigned16,
    Signed16,
    Unsigned32,
    Signed32,
    Percent,
    SignedPercent,
    Text,
    Other(i32),
}

impl From<i32> for DataType {
    fn from(code: i32) -> Self {
        match code {
            0 => DataType::Unsigned8,
            1 => DataType::Signed8,
            2 => DataType::Unsigned16,
            3 => DataType::Signed16,
            4 => DataType::Unsigned32,
            5 => DataType::Signed32,
            6 => DataType::Percent,
            7 => DataType::SignedPercent,
            8 => DataType::Text,
            other => DataType::Other(other),
        }
    }
}

impl From<DataType> for i32 {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Unsigned8 => 0,
            DataType::Signed8 => 1,
            DataType::Unsigned16 => 2,
            DataType::Signed16 => 3,
            DataType::Unsigned32 => 4,
            DataType::Signed32 => 5,
            DataType::Percent => 6,
            DataType::SignedPercent => 7,
            DataType::Text => 8,
            DataType::Other(code) => code,
        }
    }
}

impl DataType {
    /// Default vertical range for a channel stored with this type.
    pub fn plot_range(self) -> [f64; 2] {
        match self {
            DataType::Unsigned16 => [0.0, 65536.0],
            DataType::Signed16 => [-32768.0, 32768.0],
            DataType::Unsigned32 => [0.0, 4_294_967_296.0],
            DataType::Signed32 => [-2_147_483_648.0, 2_147_483_648.0],
            DataType::Percent | DataType::SignedPercent => [-100.0, 100.0],
            _ => [0.0, 256.0],
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValuesWire {
    data_type: DataType,
    #[serde(default)]
    zero: f64,
    #[serde(default = "unit_scale")]
    scaling_factor: f64,
    #[serde(default)]
    data: Vec<SampleValue>,
}

fn unit_scale() -> f64 {
    1.0
}

/// Samples as they were received plus the encoding that maps them to
/// physical units: `scaling_factor * (raw - zero)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawValuesWire")]
pub struct RawValues {
    pub data_type: DataType,
    pub zero: f64,
    pub scaling_factor: f64,
    pub data: Vec<SampleValue>,
    #[serde(skip)]
    has_string_values: bool,
}

impl From<RawValuesWire> for RawValues {
    fn from(wire: RawValuesWire) -> Self {
        RawValues::new(wire.data_type, wire.zero, wire.scaling_factor, wire.data)
    }
}

impl RawValues {
    pub fn new(data_type: DataType, zero: f64, scaling_factor: f64, data: Vec<SampleValue>) -> Self {
        let mut values = Self {
            data_type,
            zero,
            scaling_factor,
            data,
            has_string_values: false,
        };
        values.detect_strings();
        values
    }

    /// Unscaled numeric samples.
    pub fn numeric(data_type: DataType, data: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            data_type,
            0.0,
            1.0,
            data.into_iter().map(SampleValue::Number).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_string_values(&self) -> bool {
        self.has_string_values
    }

    pub fn is_scaled(&self) -> bool {
        !(self.scaling_factor == 1.0 && self.zero == 0.0)
    }

    pub fn plot_range(&self) -> [f64; 2] {
        self.data_type.plot_range()
    }

    /// Whether `other` was recorded with the same encoding.
    pub fn same_encoding(&self, other: &RawValues) -> bool {
        self.data_type == other.data_type
            && self.zero == other.zero
            && self.scaling_factor == other.scaling_factor
    }

    /// Concatenates `other` before or after the stored samples.
    pub fn add(&mut self, other: RawValues, is_before: bool) {
        if is_before {
            let mut data = other.data;
            data.append(&mut self.data);
            self.data = data;
        } else {
            self.data.extend(other.data);
        }
        self.detect_strings();
    }

    /// Scaled copy of the samples in `start..=end`, clamped to what is stored.
    pub fn get_values(&self, start: usize, end: usize) -> Vec<SampleValue> {
        if self.data.is_empty() || start > end || start >= self.data.len() {
            return Vec::new();
        }
        let end = end.min(self.data.len() - 1);
        let slice = &self.data[start..=end];
        if self.has_string_values || !self.is_scaled() {
            return slice.to_vec();
        }
        slice.iter().map(|value| self.scale(value)).collect()
    }

    fn scale(&self, value: &SampleValue) -> SampleValue {
        match value {
            SampleValue::Number(raw) => SampleValue::Number(self.scaling_factor * (raw - self.zero)),
            text => text.clone(),
        }
    }

    fn detect_strings(&mut self) {
        self.has_string_values = self.data_type == DataType::Text
            || self.data.first().is_some_and(SampleValue::is_text);
    }
}
