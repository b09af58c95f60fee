use super::view::{SampleValue, SegmentView};

// Slack for `span / delta` landing a hair above a whole pixel count.
const PIXEL_EPSILON: f64 = 1e-9;

/// Reduces `times`/`values` for display while keeping every peak and trough.
///
/// Samples are grouped by the pixel they fall in (`floor((t - t0) / delta)`)
/// and each pixel keeps its minimum and maximum in time order. The first and
/// last samples are always kept and count towards their pixel's pair, so a
/// span of `p` pixels yields at most `2 * p + 1` points whatever the spacing.
pub fn decimate_extrema(
    times: &[f64],
    values: &[f64],
    delta_time_per_pixel: f64,
) -> (Vec<f64>, Vec<f64>) {
    let count = times.len().min(values.len());
    if count <= 2 || !(delta_time_per_pixel > 0.0) {
        return (times[..count].to_vec(), values[..count].to_vec());
    }
    let first_time = times[0];
    let span = times[count - 1] - first_time;
    let pixels = ((span / delta_time_per_pixel - PIXEL_EPSILON).ceil().max(1.0)) as usize;
    let pixel_of = |t: f64| {
        let pixel = ((t - first_time) / delta_time_per_pixel).floor().max(0.0) as usize;
        pixel.min(pixels - 1)
    };

    let mut kept = Vec::with_capacity((2 * pixels + 1).min(count));
    let mut start = 0;
    while start < count {
        let pixel = pixel_of(times[start]);
        let mut end = start + 1;
        while end < count && pixel_of(times[end]) == pixel {
            end += 1;
        }
        keep_pixel(values, start, end, count - 1, &mut kept);
        start = end;
    }

    kept.into_iter().map(|i| (times[i], values[i])).unzip()
}

/// Picks the samples of one pixel (`start..end`). The first pixel may keep
/// three points, every other one two.
fn keep_pixel(values: &[f64], start: usize, end: usize, last: usize, kept: &mut Vec<usize>) {
    let mut min_index = start;
    let mut max_index = start;
    for i in start + 1..end {
        if values[i] < values[min_index] {
            min_index = i;
        }
        if values[i] > values[max_index] {
            max_index = i;
        }
    }

    let mut picks: Vec<usize> = [0, last]
        .into_iter()
        .filter(|i| (start..end).contains(i))
        .collect();
    picks.dedup();
    let budget: usize = if start == 0 { 3 } else { 2 };
    let anchor = if picks.is_empty() {
        None
    } else {
        Some(picks.iter().map(|i| values[*i]).sum::<f64>() / picks.len() as f64)
    };

    let mut extras: Vec<usize> = [min_index, max_index]
        .into_iter()
        .filter(|i| !picks.contains(i))
        .collect();
    extras.dedup();
    let room = budget.saturating_sub(picks.len());
    if extras.len() > room {
        if let Some(anchor) = anchor {
            extras.sort_by(|a, b| {
                (values[*b] - anchor)
                    .abs()
                    .total_cmp(&(values[*a] - anchor).abs())
            });
        }
        extras.truncate(room);
    }

    picks.extend(extras);
    picks.sort_unstable();
    kept.extend(picks);
}

/// Decimates a numeric segment to roughly two points per pixel. Label
/// segments are returned untouched.
pub fn decimate_segment(segment: SegmentView, delta_time_per_pixel: f64) -> SegmentView {
    if segment.has_string_values || segment.len() <= 2 {
        return segment;
    }
    let Some(values) = segment.numeric_values() else {
        return segment;
    };
    let (times, values) = decimate_extrema(&segment.times, &values, delta_time_per_pixel);
    SegmentView {
        times,
        values: values.into_iter().map(SampleValue::Number).collect(),
        ..segment
    }
}
