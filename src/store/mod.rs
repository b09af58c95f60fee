// src/store/mod.rs
pub mod channel_data;
pub mod channel_list;
pub mod constants;
pub mod data_chunk;
pub mod error;
pub mod naming;
pub mod raw_values;
pub mod search;
pub mod source;
pub mod time_range;

pub use channel_data::{AddOutcome, ChannelData};
pub use channel_list::{ChannelDataList, IngestReport, SharedChannelDataList};
pub use data_chunk::DataChunk;
pub use error::{IngestError, Result};
pub use naming::canonical_channel_name;
pub use raw_values::{DataType, RawValues};
pub use search::{binary_search, SearchPolicy};
pub use source::{BatchSource, DataBatchItem, ManualSource};
pub use time_range::{format_duration_hhmmss, merge_times, TimeRange};
