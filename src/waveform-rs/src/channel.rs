use log::debug;

use super::{
    config::ChannelPreferences,
    decimate::decimate_segment,
    filter::FilterChain,
    view::{SampleValue, SegmentView},
};

/// Requested display window plus the horizontal resolution of the plot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayWindow {
    pub start_time: f64,
    pub end_time: f64,
    pub pixel_budget: usize,
}

impl DisplayWindow {
    pub fn new(start_time: f64, end_time: f64, pixel_budget: usize) -> Self {
        Self {
            start_time,
            end_time,
            pixel_budget,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn delta_time_per_pixel(&self) -> f64 {
        if self.pixel_budget == 0 {
            return 0.0;
        }
        self.duration() / self.pixel_budget as f64
    }
}

/// Turns the raw segments of one channel into what the renderer draws:
/// reference subtraction, filtering, trimming the settling lead-in,
/// polarity and decimation, in that order.
pub struct ChannelProcessor<'a> {
    prefs: &'a ChannelPreferences,
    window: DisplayWindow,
}

impl<'a> ChannelProcessor<'a> {
    pub fn new(prefs: &'a ChannelPreferences, window: DisplayWindow) -> Self {
        Self { prefs, window }
    }

    pub fn process(
        &self,
        mut segments: Vec<SegmentView>,
        references: &[Vec<SegmentView>],
    ) -> Vec<SegmentView> {
        if !references.is_empty() && !apply_reference(&mut segments, references) {
            debug!("reference layout differs from channel layout; skipping referencing");
        }
        self.apply_filters(&mut segments);
        let mut segments = trim_to_window(segments, self.window.start_time);
        if self.prefs.polarity {
            for segment in &mut segments {
                invert(segment);
            }
        }
        let delta = self.window.delta_time_per_pixel();
        segments
            .into_iter()
            .map(|segment| decimate_segment(segment, delta))
            .collect()
    }

    fn apply_filters(&self, segments: &mut [SegmentView]) {
        let kinds = self.prefs.filter_kinds();
        if kinds.is_empty() {
            return;
        }
        for segment in segments.iter_mut().filter(|s| s.is_filterable()) {
            // A fresh chain per segment: state never leaks across gaps.
            let mut chain = FilterChain::from_kinds(segment.sampling_time, &kinds);
            chain.reset();
            for value in segment.values.iter_mut() {
                if let SampleValue::Number(v) = value {
                    *v = chain.process_sample(*v);
                }
            }
        }
    }
}

/// Subtracts the sample-wise mean of `references` from `segments`.
///
/// Every reference must have exactly the same segment layout (segment count
/// and per-segment sample count) as the channel; otherwise nothing is changed
/// and `false` is returned.
pub fn apply_reference(segments: &mut [SegmentView], references: &[Vec<SegmentView>]) -> bool {
    if references.is_empty() {
        return false;
    }
    let layout_matches = references.iter().all(|reference| {
        reference.len() == segments.len()
            && reference
                .iter()
                .zip(segments.iter())
                .all(|(r, s)| r.len() == s.len() && !r.has_string_values)
    });
    if !layout_matches || segments.iter().any(|s| s.has_string_values) {
        return false;
    }
    let count = references.len() as f64;
    for (index, segment) in segments.iter_mut().enumerate() {
        for (i, value) in segment.values.iter_mut().enumerate() {
            let SampleValue::Number(v) = value else {
                continue;
            };
            let sum: f64 = references
                .iter()
                .filter_map(|reference| reference[index].values[i].as_number())
                .sum();
            *v -= sum / count;
        }
    }
    true
}

/// Drops samples ahead of `start_time`, keeping the one sample at or right
/// before it so the trace still enters the window from the left edge.
pub fn trim_to_window(segments: Vec<SegmentView>, start_time: f64) -> Vec<SegmentView> {
    segments
        .into_iter()
        .filter(|segment| segment.times.last().is_some_and(|t| *t >= start_time))
        .map(|mut segment| {
            let first_inside = segment.times.partition_point(|t| *t <= start_time);
            let keep_from = first_inside.saturating_sub(1);
            if keep_from > 0 {
                segment.times.drain(..keep_from);
                segment.values.drain(..keep_from);
            }
            segment
        })
        .collect()
}

fn invert(segment: &mut SegmentView) {
    for value in segment.values.iter_mut() {
        if let SampleValue::Number(v) = value {
            *v = -*v;
        }
    }
}
