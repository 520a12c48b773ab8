//! The timeblock record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::time::TimeOfDayTz;
use crate::error::{Result, ValidationError};

/// One day's contiguous availability interval.
///
/// Serializes to the persisted row shape
/// `{ id?, date: "YYYY-MM-DD", start_time: "HH:mm:ss±ZZ", end_time }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeblock {
    /// Row id; absent for fragments that have not been persisted yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub start_time: TimeOfDayTz,
    pub end_time: TimeOfDayTz,
}

impl Timeblock {
    /// Create a timeblock without an id
    pub fn new(date: NaiveDate, start_time: TimeOfDayTz, end_time: TimeOfDayTz) -> Self {
        Self {
            id: None,
            date,
            start_time,
            end_time,
        }
    }

    /// Build from wire strings.
    ///
    /// # Errors
    /// Returns a validation error if the date or either time fails to parse.
    pub fn parse(date: &str, start_time: &str, end_time: &str) -> Result<Self> {
        Ok(Self::new(parse_date(date)?, start_time.parse()?, end_time.parse()?))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Composite `(date, start_time)` key as an absolute instant
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start_time.on_date(self.date)
    }

    /// Composite `(date, end_time)` key as an absolute instant
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.end_time.on_date(self.date)
    }

    /// True for zero- or negative-duration blocks
    pub fn is_empty(&self) -> bool {
        self.start_instant() >= self.end_instant()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_instant() - self.start_instant()).num_minutes()
    }
}

/// Strict `YYYY-MM-DD`: four-digit year, no sign.
fn parse_date(raw: &str) -> std::result::Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate(raw.to_string());
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

mod wire_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_roundtrip_keeps_strings() {
        let raw = r#"{"id":"tb-1","date":"2024-01-01","start_time":"09:00:00+07","end_time":"11:30:00+07"}"#;
        let tb: Timeblock = serde_json::from_str(raw).unwrap();
        assert_eq!(tb.id.as_deref(), Some("tb-1"));
        assert_eq!(tb.duration_minutes(), 150);
        assert_eq!(serde_json::to_string(&tb).unwrap(), raw);
    }

    #[test]
    fn missing_id_is_omitted() {
        let tb = Timeblock::parse("2024-01-01", "09:00:00Z", "10:00:00Z").unwrap();
        let json = serde_json::to_value(&tb).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn parse_rejects_bad_date() {
        assert!(Timeblock::parse("01/01/2024", "09:00:00Z", "10:00:00Z").is_err());
        assert!(Timeblock::parse("+262142-12-31", "09:00:00Z", "10:00:00Z").is_err());
        assert!(Timeblock::parse("2024-1-01", "09:00:00Z", "10:00:00Z").is_err());
    }

    #[test]
    fn wire_date_must_be_four_digit_year() {
        let raw = r#"[{"date":"+262142-12-31","start_time":"09:00:00-10:00","end_time":"23:00:00-10:00"}]"#;
        let err = serde_json::from_str::<Vec<Timeblock>>(raw).unwrap_err();
        assert!(err.to_string().contains("+262142-12-31"));

        let ok = r#"{"date":"0999-03-01","start_time":"09:00:00Z","end_time":"10:00:00Z"}"#;
        let tb: Timeblock = serde_json::from_str(ok).unwrap();
        assert_eq!(serde_json::to_string(&tb).unwrap(), ok);
    }

    #[test]
    fn emptiness_follows_instants() {
        assert!(Timeblock::parse("2024-01-01", "10:00:00Z", "10:00:00Z").unwrap().is_empty());
        assert!(!Timeblock::parse("2024-01-01", "10:00:00+02:00", "09:00:00Z").unwrap().is_empty());
    }
}
