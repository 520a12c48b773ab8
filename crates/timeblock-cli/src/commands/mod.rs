pub mod blocks;
pub mod config;
pub mod schedule;

use chrono::{DateTime, FixedOffset};
use std::io::Read;

/// Read a whole file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?)
}

/// clap value parser for RFC 3339 instants.
pub fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("expected an RFC 3339 instant: {e}"))
}
