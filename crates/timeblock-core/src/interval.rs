//! Absolute date ranges and their interval algebra.
//!
//! Used by the scheduler to intersect active-hour windows with the time
//! that is already taken.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A half-open `[start, end)` range of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Like [`new`](Self::new) but rejects empty ranges.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTimeRange`] if `end <= start`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this range overlaps another (touching is not overlapping)
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Check if `other` lies entirely inside this range
    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Common part of two ranges, if any
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let range = DateRange::new(self.start.max(other.start), self.end.min(other.end));
        (!range.is_empty()).then_some(range)
    }
}

/// Union of `ranges`: sorted, with overlapping or touching ranges joined and
/// empty ranges dropped.
pub fn merge_ranges(ranges: &[DateRange]) -> Vec<DateRange> {
    let mut sorted: Vec<DateRange> = ranges.iter().filter(|r| !r.is_empty()).copied().collect();
    sorted.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<DateRange> = Vec::with_capacity(sorted.len());
    for current in sorted {
        match merged.last_mut() {
            Some(last) if last.end >= current.start => {
                last.end = last.end.max(current.end);
            }
            _ => merged.push(current),
        }
    }
    merged
}

/// Remove every `busy` range from `windows`, splitting windows that
/// straddle a busy range. Output is sorted and free of empty ranges.
pub fn subtract_ranges(windows: &[DateRange], busy: &[DateRange]) -> Vec<DateRange> {
    let busy = merge_ranges(busy);
    let mut free = Vec::new();

    for window in merge_ranges(windows) {
        let mut cursor = window.start;
        for taken in busy.iter().filter(|b| b.overlaps(&window)) {
            if taken.start > cursor {
                free.push(DateRange::new(cursor, taken.start));
            }
            cursor = cursor.max(taken.end);
        }
        if cursor < window.end {
            free.push(DateRange::new(cursor, window.end));
        }
    }
    free
}

/// Intersect each window with `bounds`, dropping windows outside it.
pub fn clip_ranges(windows: &[DateRange], bounds: &DateRange) -> Vec<DateRange> {
    windows.iter().filter_map(|w| w.intersect(bounds)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn h(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn r(start: u32, end: u32) -> DateRange {
        DateRange::new(h(start), h(end))
    }

    #[test]
    fn try_new_rejects_empty() {
        assert!(DateRange::try_new(h(10), h(10)).is_err());
        assert!(DateRange::try_new(h(10), h(11)).is_ok());
    }

    #[test]
    fn merge_joins_overlap_and_adjacency() {
        let merged = merge_ranges(&[r(13, 14), r(9, 10), r(10, 11), r(9, 12), r(15, 15)]);
        assert_eq!(merged, vec![r(9, 12), r(13, 14)]);
    }

    #[test]
    fn subtract_splits_windows() {
        let free = subtract_ranges(&[r(8, 18)], &[r(10, 11), r(12, 13), r(17, 19)]);
        assert_eq!(free, vec![r(8, 10), r(11, 12), r(13, 17)]);
    }

    #[test]
    fn subtract_with_nothing_busy_is_merge() {
        assert_eq!(subtract_ranges(&[r(8, 9), r(9, 10)], &[]), vec![r(8, 10)]);
    }

    #[test]
    fn subtract_fully_covered_window() {
        assert!(subtract_ranges(&[r(9, 10)], &[r(8, 11)]).is_empty());
    }

    #[test]
    fn clip_and_intersect() {
        assert_eq!(clip_ranges(&[r(8, 10), r(12, 14)], &r(9, 13)), vec![r(9, 10), r(12, 13)]);
        assert!(r(8, 9).intersect(&r(9, 10)).is_none());
        assert!(r(8, 12).contains(&r(9, 10)));
        assert!(!r(8, 9).overlaps(&r(9, 10)));
    }
}
