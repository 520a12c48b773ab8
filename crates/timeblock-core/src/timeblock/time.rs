//! Wall-clock time of day with a UTC offset (`HH:mm:ss±ZZ`).
//!
//! This is the persisted shape of a timeblock's `start_time`/`end_time`.
//! Consumers parse it positionally, so a parsed value remembers how its
//! offset was written and formats back the same way.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const SECONDS_PER_DAY: i64 = 86_400;

/// How the UTC offset of a [`TimeOfDayTz`] is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OffsetNotation {
    /// `Z` (UTC only)
    Zulu,
    /// `+07`
    Hour,
    /// `+0700`
    Compact,
    /// `+07:00`
    #[default]
    Colon,
}

/// A time of day with an explicit UTC offset, second precision.
///
/// Equality is structural (same wall-clock, same offset, same notation).
/// Chronological comparison goes through a [`TimetzOrdering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDayTz {
    time: NaiveTime,
    offset: FixedOffset,
    notation: OffsetNotation,
}

impl TimeOfDayTz {
    /// Create from a wall-clock time and offset. Sub-second precision is dropped.
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            time: truncate_to_seconds(time),
            offset,
            notation: OffsetNotation::Colon,
        }
    }

    /// Time of day of an instant, in that instant's own offset.
    pub fn from_datetime(dt: &DateTime<FixedOffset>) -> Self {
        Self::new(dt.time(), *dt.offset())
    }

    /// Time of day of an instant, expressed in this value's offset and notation.
    pub fn rebase(&self, dt: &DateTime<FixedOffset>) -> Self {
        let local = dt.with_timezone(&self.offset);
        Self {
            time: truncate_to_seconds(local.time()),
            offset: self.offset,
            notation: self.notation,
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn notation(&self) -> OffsetNotation {
        self.notation
    }

    /// Seconds since midnight UTC. Not wrapped into a single day, so values
    /// east of UTC may be negative and values west of UTC may exceed a day.
    pub fn utc_seconds(&self) -> i64 {
        i64::from(self.time.num_seconds_from_midnight()) - i64::from(self.offset.local_minus_utc())
    }

    /// The instant this time of day denotes on a given calendar date.
    pub fn on_date(&self, date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            + chrono::Duration::seconds(self.utc_seconds())
    }

    /// Shift the wall-clock by `minutes`, clamped to the same day
    /// (`00:00:00`..=`23:59:59`).
    pub fn saturating_add_minutes(&self, minutes: i64) -> Self {
        let secs = i64::from(self.time.num_seconds_from_midnight())
            .saturating_add(minutes.saturating_mul(60))
            .clamp(0, SECONDS_PER_DAY - 1);
        let time = u32::try_from(secs)
            .ok()
            .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
            .unwrap_or(self.time);
        Self { time, ..*self }
    }
}

fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

fn parse_offset(zone: &str) -> Option<(FixedOffset, OffsetNotation)> {
    if zone == "Z" {
        return Some((FixedOffset::east_opt(0)?, OffsetNotation::Zulu));
    }
    if !zone.is_ascii() || zone.len() < 3 {
        return None;
    }

    let sign = match zone.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let rest = &zone[1..];
    let (hours, minutes, notation) = match rest.len() {
        2 => (rest, "00", OffsetNotation::Hour),
        4 => (&rest[..2], &rest[2..], OffsetNotation::Compact),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..], OffsetNotation::Colon),
        _ => return None,
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
    Some((offset, notation))
}

impl FromStr for TimeOfDayTz {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        if s.len() < 9 || !s.is_char_boundary(8) {
            return Err(invalid());
        }

        let (clock, zone) = s.split_at(8);
        let time = NaiveTime::parse_from_str(clock, "%H:%M:%S").map_err(|_| invalid())?;
        let (offset, notation) = parse_offset(zone).ok_or_else(invalid)?;

        Ok(Self {
            time,
            offset,
            notation,
        })
    }
}

impl fmt::Display for TimeOfDayTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S"))?;

        let secs = self.offset.local_minus_utc();
        if secs == 0 && self.notation == OffsetNotation::Zulu {
            return f.write_str("Z");
        }

        let sign = if secs < 0 { '-' } else { '+' };
        let abs = secs.abs();
        let (hours, minutes) = (abs / 3600, (abs % 3600) / 60);
        match self.notation {
            OffsetNotation::Hour if minutes == 0 => write!(f, "{sign}{hours:02}"),
            OffsetNotation::Compact => write!(f, "{sign}{hours:02}{minutes:02}"),
            _ => write!(f, "{sign}{hours:02}:{minutes:02}"),
        }
    }
}

impl Serialize for TimeOfDayTz {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDayTz {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Chronological comparison of two [`TimeOfDayTz`] values.
///
/// The interval engine never compares time strings directly; every
/// ordering decision goes through an implementation of this trait.
pub trait TimetzOrdering {
    fn compare(&self, a: &TimeOfDayTz, b: &TimeOfDayTz) -> Ordering;

    /// The chronologically earlier value (`a` on ties).
    fn min_timetz(&self, a: TimeOfDayTz, b: TimeOfDayTz) -> TimeOfDayTz {
        if self.compare(&b, &a) == Ordering::Less {
            b
        } else {
            a
        }
    }

    /// The chronologically later value (`a` on ties).
    fn max_timetz(&self, a: TimeOfDayTz, b: TimeOfDayTz) -> TimeOfDayTz {
        if self.compare(&b, &a) == Ordering::Greater {
            b
        } else {
            a
        }
    }
}

/// Compares after normalizing both values to UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetAware;

impl TimetzOrdering for OffsetAware {
    fn compare(&self, a: &TimeOfDayTz, b: &TimeOfDayTz) -> Ordering {
        a.utc_seconds().cmp(&b.utc_seconds())
    }
}
