pub mod channel;
pub mod config;
pub mod decimate;
pub mod filter;
pub mod view;
pub use channel::{ChannelProcessor, DisplayWindow};
pub use config::{ChannelPreferences, ChartType, NotchSetting, PlotPreferences, PreferenceSource};
pub use decimate::{decimate_extrema, decimate_segment};
pub use filter::{
    BandPassFilter, Filter, FilterChain, FilterKind, HighPassFilter, LowPassFilter, NotchFilter,
    SignalFilter,
};
pub use view::{ChannelView, SampleValue, SegmentView};
