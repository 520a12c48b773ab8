//! Timeblock interval engine: merge, subtract and drag expansion.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::block::Timeblock;
use super::time::{OffsetAware, TimeOfDayTz, TimetzOrdering};
use crate::error::{CoreError, Result};

/// Earliest and latest instants of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeMatrix {
    pub soonest: DateTime<FixedOffset>,
    pub latest: DateTime<FixedOffset>,
}

/// Upper bound for [`TimeblockConfig::drag_padding_minutes`] (one day)
pub const MAX_DRAG_PADDING_MINUTES: i64 = 1440;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct TimeblockConfig {
    /// Padding added to the end of a drag selection (minutes,
    /// `0..=MAX_DRAG_PADDING_MINUTES`)
    pub drag_padding_minutes: i64,
}

impl Default for TimeblockConfig {
    fn default() -> Self {
        Self {
            drag_padding_minutes: 15,
        }
    }
}

/// Interval algebra over timeblock collections.
///
/// All operations are pure: inputs are borrowed and a fresh collection is
/// returned. Time-of-day comparisons go through the injected ordering `C`.
pub struct TimeblockEngine<C = OffsetAware> {
    config: TimeblockConfig,
    ordering: C,
}

impl TimeblockEngine<OffsetAware> {
    /// Create an engine with default config and offset-aware ordering
    pub fn new() -> Self {
        Self::with_ordering(TimeblockConfig::default(), OffsetAware)
    }

    /// Create with custom config
    pub fn with_config(config: TimeblockConfig) -> Self {
        Self::with_ordering(config, OffsetAware)
    }
}

impl Default for TimeblockEngine<OffsetAware> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimetzOrdering> TimeblockEngine<C> {
    /// Create with custom config and time-of-day ordering
    pub fn with_ordering(config: TimeblockConfig, ordering: C) -> Self {
        Self { config, ordering }
    }

    pub fn config(&self) -> &TimeblockConfig {
        &self.config
    }

    fn padding(&self) -> Result<Duration> {
        let minutes = self.config.drag_padding_minutes;
        if !(0..=MAX_DRAG_PADDING_MINUTES).contains(&minutes) {
            return Err(bad_padding(minutes));
        }
        Duration::try_minutes(minutes).ok_or_else(|| bad_padding(minutes))
    }

    /// Earliest and latest of `dates`, with `latest` padded by the drag padding.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidInput`] if `dates` is empty, or if the
    /// configured padding is out of range or overflows the latest instant.
    pub fn date_matrix(&self, dates: &[DateTime<FixedOffset>]) -> Result<DateTimeMatrix> {
        let soonest = dates.iter().min().copied().ok_or_else(empty_selection)?;
        let latest = dates.iter().max().copied().ok_or_else(empty_selection)?;
        let padded = latest
            .checked_add_signed(self.padding()?)
            .ok_or_else(|| CoreError::InvalidInput(format!("padded selection end overflows: {latest}")))?;

        Ok(DateTimeMatrix {
            soonest,
            latest: padded,
        })
    }

    /// Earliest and latest time of day of `dates`, all moved onto today.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidInput`] if `dates` is empty.
    pub fn time_matrix(&self, dates: &[DateTime<FixedOffset>]) -> Result<DateTimeMatrix> {
        self.time_matrix_on(dates, Utc::now().date_naive())
    }

    /// Like [`time_matrix`](Self::time_matrix) with an explicit anchor day.
    ///
    /// A single instant is returned unchanged as both bounds.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidInput`] if `dates` is empty.
    pub fn time_matrix_on(
        &self,
        dates: &[DateTime<FixedOffset>],
        anchor: NaiveDate,
    ) -> Result<DateTimeMatrix> {
        if let [only] = dates {
            return Ok(DateTimeMatrix {
                soonest: *only,
                latest: *only,
            });
        }

        let normalized: Vec<DateTime<FixedOffset>> = dates
            .iter()
            .filter_map(|d| anchor.and_time(d.time()).and_local_timezone(*d.offset()).single())
            .collect();

        let soonest = normalized.iter().min().copied().ok_or_else(empty_selection)?;
        let latest = normalized.iter().max().copied().ok_or_else(empty_selection)?;
        Ok(DateTimeMatrix { soonest, latest })
    }

    /// Expand a two-point drag gesture into one timeblock per day.
    ///
    /// Days run from the first instant's day up to, but not including, the
    /// day of the padded last instant. Every block shares the gesture's
    /// time-of-day span, its end padded and clamped to the same day.
    /// Any other number of instants yields no blocks.
    pub fn duration_to_timeblocks(&self, dates: &[DateTime<FixedOffset>]) -> Vec<Timeblock> {
        if dates.len() != 2 {
            return Vec::new();
        }
        let (Ok(days), Ok(times)) = (self.date_matrix(dates), self.time_matrix(dates)) else {
            return Vec::new();
        };

        let start_time = TimeOfDayTz::from_datetime(&times.soonest);
        let end_time = TimeOfDayTz::from_datetime(&times.latest)
            .saturating_add_minutes(self.config.drag_padding_minutes);

        let last_day = days.latest.date_naive();
        let mut day = days.soonest.date_naive();
        let mut blocks = Vec::new();
        while day < last_day {
            blocks.push(Timeblock::new(day, start_time, end_time));
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        tracing::debug!(days = blocks.len(), %start_time, %end_time, "expanded drag selection");
        blocks
    }

    /// Union of two collections.
    ///
    /// Sorted by `(date, start_time, end_time)`, then swept once: a block
    /// inside the last emitted one (inclusive bounds) is dropped, a block
    /// touching or overlapping it extends its end, anything else is
    /// appended. Blocks on different dates are never merged.
    pub fn add_timeblocks(&self, prev: &[Timeblock], new: &[Timeblock]) -> Vec<Timeblock> {
        let mut all: Vec<Timeblock> = prev.iter().chain(new).cloned().collect();
        all.sort_by(|a, b| self.compare_blocks(a, b));

        let mut merged: Vec<Timeblock> = Vec::with_capacity(all.len());
        for current in all {
            match merged.last_mut() {
                Some(last) if last.date == current.date => {
                    if self.within(&current.start_time, last) && self.within(&current.end_time, last) {
                        continue;
                    }
                    if self.ordering.compare(&last.end_time, &current.start_time) != Ordering::Less {
                        last.end_time = current.end_time;
                        continue;
                    }
                }
                _ => {}
            }
            merged.push(current);
        }

        tracing::debug!(
            prev = prev.len(),
            new = new.len(),
            merged = merged.len(),
            "merged timeblocks"
        );
        merged
    }

    /// Remove the window spanned by `dates` from `prev`.
    ///
    /// Blocks outside the window pass through untouched. Overlapping blocks
    /// are cut into a head fragment (before the window) and a tail fragment
    /// (after it); fragments carry no id and empty fragments are dropped.
    /// An empty `dates` selection, or one whose window cannot be built,
    /// returns `prev` unchanged.
    pub fn remove_timeblocks(
        &self,
        prev: &[Timeblock],
        dates: &[DateTime<FixedOffset>],
    ) -> Vec<Timeblock> {
        let window = match self.date_matrix(dates) {
            Ok(window) => window,
            Err(err) => {
                if !dates.is_empty() {
                    tracing::warn!(%err, "cannot build removal window, keeping timeblocks");
                }
                return prev.to_vec();
            }
        };
        let soonest = window.soonest.with_timezone(&Utc);
        let latest = window.latest.with_timezone(&Utc);

        let mut result = Vec::with_capacity(prev.len() + 1);
        for tb in prev {
            let (start, end) = (tb.start_instant(), tb.end_instant());
            if end <= soonest || start >= latest {
                result.push(tb.clone());
                continue;
            }

            if start < soonest {
                let cut = tb.end_time.rebase(&window.soonest);
                let head = Timeblock::new(tb.date, tb.start_time, self.ordering.min_timetz(cut, tb.end_time));
                if self.is_positive(&head) {
                    result.push(head);
                }
            }
            if end > latest {
                let cut = tb.start_time.rebase(&window.latest);
                let tail = Timeblock::new(tb.date, self.ordering.max_timetz(cut, tb.start_time), tb.end_time);
                if self.is_positive(&tail) {
                    result.push(tail);
                }
            }
        }

        tracing::debug!(
            before = prev.len(),
            after = result.len(),
            soonest = %window.soonest,
            latest = %window.latest,
            "removed timeblock window"
        );
        result
    }

    fn compare_blocks(&self, a: &Timeblock, b: &Timeblock) -> Ordering {
        a.date
            .cmp(&b.date)
            .then_with(|| self.ordering.compare(&a.start_time, &b.start_time))
            .then_with(|| self.ordering.compare(&a.end_time, &b.end_time))
    }

    fn within(&self, t: &TimeOfDayTz, block: &Timeblock) -> bool {
        self.ordering.compare(t, &block.start_time) != Ordering::Less
            && self.ordering.compare(t, &block.end_time) != Ordering::Greater
    }

    fn is_positive(&self, tb: &Timeblock) -> bool {
        self.ordering.compare(&tb.start_time, &tb.end_time) == Ordering::Less
    }
}

fn empty_selection() -> CoreError {
    CoreError::InvalidInput("date selection is empty".into())
}

fn bad_padding(minutes: i64) -> CoreError {
    CoreError::InvalidInput(format!(
        "drag padding must be between 0 and {MAX_DRAG_PADDING_MINUTES} minutes, got {minutes}"
    ))
}
