use serde::{Deserialize, Serialize};

use super::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use super::error::{IngestError, Result};

/// Closed interval of absolute times, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: f64,
    pub end_time: f64,
}

impl TimeRange {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Range spanned by the first and last entries of `times`.
    pub fn from_times(times: &[f64]) -> Option<Self> {
        match (times.first(), times.last()) {
            (Some(first), Some(last)) => Some(Self::new(*first, *last)),
            _ => None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Widens the range to cover `times[0]` and `times[last]`.
    pub fn merge(&mut self, times: &[f64]) -> Result<()> {
        if times.len() < 2 {
            return Err(IngestError::TooFewTimes {
                expected: 2,
                actual: times.len(),
            });
        }
        self.start_time = self.start_time.min(times[0]);
        self.end_time = self.end_time.max(times[times.len() - 1]);
        Ok(())
    }

    /// Boundary-inclusive overlap test.
    pub fn intersects(&self, other: &TimeRange) -> bool {
        self.start_time <= other.end_time && other.start_time <= self.end_time
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Same range with the start moved `extra` seconds earlier.
    pub fn expanded_before(&self, extra: f64) -> Self {
        Self::new(self.start_time - extra.max(0.0), self.end_time)
    }

    pub fn duration_hhmmss(&self) -> String {
        format_duration_hhmmss(self.duration())
    }
}

/// Widens `range` to cover `times`, creating it on first use.
pub fn merge_times(range: &mut Option<TimeRange>, times: &[f64]) -> Result<()> {
    match range {
        Some(range) => range.merge(times),
        None => {
            if times.len() < 2 {
                return Err(IngestError::TooFewTimes {
                    expected: 2,
                    actual: times.len(),
                });
            }
            *range = TimeRange::from_times(times);
            Ok(())
        }
    }
}

/// `D HH:MM:SS` for spans of a day or more, `HH:MM:SS` otherwise.
/// Negative or non-finite spans render as zero.
pub fn format_duration_hhmmss(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let sec = seconds.round() as u64 % 60;
    let min = (seconds / SECONDS_PER_MINUTE).floor() as u64 % 60;
    let hour = (seconds / SECONDS_PER_HOUR).floor() as u64 % 24;
    let day = (seconds / SECONDS_PER_DAY).floor() as u64;
    if day > 0 {
        format!("{day} {hour:02}:{min:02}:{sec:02}")
    } else {
        format!("{hour:02}:{min:02}:{sec:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_widens_both_ends() {
        let mut range = TimeRange::new(10.0, 20.0);
        range.merge(&[5.0, 12.0, 15.0]).unwrap();
        assert_eq!(range, TimeRange::new(5.0, 20.0));
        range.merge(&[18.0, 42.0]).unwrap();
        assert_eq!(range, TimeRange::new(5.0, 42.0));
    }

    #[test]
    fn merge_rejects_single_time() {
        let mut range = TimeRange::new(0.0, 1.0);
        assert!(matches!(
            range.merge(&[3.0]),
            Err(IngestError::TooFewTimes { actual: 1, .. })
        ));
        assert_eq!(range, TimeRange::new(0.0, 1.0));
    }

    #[test]
    fn unset_range_is_created_by_first_merge() {
        let mut range = None;
        merge_times(&mut range, &[7.0, 7.0]).unwrap();
        assert_eq!(range, Some(TimeRange::new(7.0, 7.0)));
        assert_eq!(range.unwrap().duration(), 0.0);
        merge_times(&mut range, &[1.0, 3.0]).unwrap();
        assert_eq!(range, Some(TimeRange::new(1.0, 7.0)));
    }

    #[test]
    fn intersects_is_boundary_inclusive() {
        let a = TimeRange::new(0.0, 10.0);
        assert!(a.intersects(&TimeRange::new(10.0, 20.0)));
        assert!(a.intersects(&TimeRange::new(-5.0, 0.0)));
        assert!(a.intersects(&TimeRange::new(2.0, 3.0)));
        assert!(!a.intersects(&TimeRange::new(10.5, 20.0)));
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration_hhmmss(90061.0), "1 01:01:01");
        assert_eq!(format_duration_hhmmss(3661.0), "01:01:01");
        assert_eq!(format_duration_hhmmss(0.0), "00:00:00");
        assert_eq!(format_duration_hhmmss(-30.0), "00:00:00");
        assert_eq!(TimeRange::new(100.0, 28900.0).duration_hhmmss(), "08:00:00");
    }
}
