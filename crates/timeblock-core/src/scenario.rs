//! Template scenarios: a named set of tasks and active hours stored as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::interval::DateRange;
use crate::schedule::{ActiveHours, ScheduleResult, Task};
use crate::scheduler::AutoScheduler;

/// A reusable scheduling input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateScenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub active_hours: ActiveHours,
}

impl TemplateScenario {
    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    /// Returns [`CoreError::Json`](crate::CoreError::Json) on malformed input,
    /// or a validation error if a range in it is empty or inverted.
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate_ranges()?;
        Ok(scenario)
    }

    /// Every active-hour window and existing event must end after it starts.
    /// Task duration bounds are left to the scheduler, which logs them.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTimeRange`](crate::ValidationError::InvalidTimeRange)
    /// for the first offending range.
    pub fn validate_ranges(&self) -> Result<()> {
        let hours = &self.active_hours;
        let windows = hours.personal.iter().chain(&hours.work).chain(&hours.meeting);
        let events = self.tasks.iter().flat_map(|t| t.events.iter().map(|e| &e.range));
        for range in windows.chain(events) {
            DateRange::try_new(range.start, range.end)?;
        }
        Ok(())
    }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be read, or a JSON error if it
    /// does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let scenario = Self::from_json(&content)?;
        tracing::debug!(path = %path.as_ref().display(), name = %scenario.name, tasks = scenario.tasks.len(), "loaded scenario");
        Ok(scenario)
    }

    /// Schedule this scenario's tasks into its active hours.
    pub fn run(&self, scheduler: &AutoScheduler, now: DateTime<Utc>) -> ScheduleResult {
        scheduler.schedule(&self.tasks, &self.active_hours, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::schedule::Event;
    use chrono::TimeZone;
    use std::io::Write;

    const WEEKDAY: &str = r#"{
        "name": "Weekday",
        "tasks": [
            { "id": "a", "name": "Inbox", "duration": 30, "minDuration": 15, "maxDuration": 30,
              "category": "work", "priority": "low" },
            { "id": "b", "name": "Design doc", "duration": 90, "minDuration": 30, "maxDuration": 60,
              "category": "work", "priority": "critical", "allowSplit": true }
        ],
        "activeHours": {
            "work": [ { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T11:00:00Z" } ]
        }
    }"#;

    #[test]
    fn parses_and_runs() {
        let scenario = TemplateScenario::from_json(WEEKDAY).unwrap();
        assert_eq!(scenario.tasks.len(), 2);
        assert!(scenario.active_hours.personal.is_empty());

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = scenario.run(&AutoScheduler::new(), now);

        assert!(result.logs.is_empty());
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.events[0].task_id, "b");
        assert_eq!(result.events[2].task_id, "a");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(WEEKDAY.as_bytes()).unwrap();
        let scenario = TemplateScenario::load(file.path()).unwrap();
        assert_eq!(scenario.name, "Weekday");
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let inverted_window = WEEKDAY.replace(
            r#""start": "2024-01-01T09:00:00Z", "end": "2024-01-01T11:00:00Z""#,
            r#""start": "2024-01-01T11:00:00Z", "end": "2024-01-01T09:00:00Z""#,
        );
        assert!(matches!(
            TemplateScenario::from_json(&inverted_window),
            Err(CoreError::Validation(ValidationError::InvalidTimeRange { .. }))
        ));

        let mut scenario = TemplateScenario::from_json(WEEKDAY).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let task = scenario.tasks[0].clone();
        let locked = Event::for_task(&task, DateRange::new(start, start)).locked();
        scenario.tasks[0] = task.with_events(vec![locked]);
        let json = serde_json::to_string(&scenario).unwrap();
        assert!(matches!(TemplateScenario::from_json(&json), Err(CoreError::Validation(_))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(TemplateScenario::from_json("{"), Err(CoreError::Json(_))));
        assert!(matches!(TemplateScenario::load("/nonexistent/scenario.json"), Err(CoreError::Io(_))));
    }
}
