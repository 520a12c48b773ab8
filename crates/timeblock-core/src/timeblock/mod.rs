//! Timeblock interval engine.
//!
//! Availability is a set of non-overlapping, timezone-aware timeblocks
//! (one calendar date plus a start and end time of day). This module
//! provides:
//! - Union of proposed availability into existing availability
//! - Subtraction of a selected window, splitting straddling blocks
//! - Expansion of a two-point drag gesture into a recurring daily block
//!
//! The free functions use a default [`TimeblockEngine`].

mod block;
mod engine;
mod time;

use chrono::{DateTime, FixedOffset};

pub use block::Timeblock;
pub use engine::{DateTimeMatrix, TimeblockConfig, TimeblockEngine, MAX_DRAG_PADDING_MINUTES};
pub use time::{OffsetAware, OffsetNotation, TimeOfDayTz, TimetzOrdering};

use crate::error::Result;

/// See [`TimeblockEngine::date_matrix`]
pub fn date_matrix(dates: &[DateTime<FixedOffset>]) -> Result<DateTimeMatrix> {
    TimeblockEngine::new().date_matrix(dates)
}

/// See [`TimeblockEngine::time_matrix`]
pub fn time_matrix(dates: &[DateTime<FixedOffset>]) -> Result<DateTimeMatrix> {
    TimeblockEngine::new().time_matrix(dates)
}

/// See [`TimeblockEngine::duration_to_timeblocks`]
pub fn duration_to_timeblocks(dates: &[DateTime<FixedOffset>]) -> Vec<Timeblock> {
    TimeblockEngine::new().duration_to_timeblocks(dates)
}

/// See [`TimeblockEngine::add_timeblocks`]
pub fn add_timeblocks(prev: &[Timeblock], new: &[Timeblock]) -> Vec<Timeblock> {
    TimeblockEngine::new().add_timeblocks(prev, new)
}

/// See [`TimeblockEngine::remove_timeblocks`]
pub fn remove_timeblocks(prev: &[Timeblock], dates: &[DateTime<FixedOffset>]) -> Vec<Timeblock> {
    TimeblockEngine::new().remove_timeblocks(prev, dates)
}
