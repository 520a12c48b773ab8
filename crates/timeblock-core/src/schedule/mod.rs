//! Scheduling contract: tasks, placed events, active hours and results.
//!
//! These types are the JSON shape exchanged with a scheduling UI or a
//! scenario file. Durations are whole minutes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::interval::{merge_ranges, DateRange};

/// Category of a task; selects the active-hour windows it may use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Meeting,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Meeting => "meeting",
        }
    }
}

/// Task priority, most urgent first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

impl TaskPriority {
    /// Scheduling weight; higher is placed first
    pub fn weight(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Normal => 2,
            Self::Low => 1,
        }
    }
}

/// A piece of work to be placed on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Total minutes wanted
    pub duration: i64,
    /// Shortest acceptable part (minutes)
    pub min_duration: i64,
    /// Longest acceptable part (minutes)
    pub max_duration: i64,
    pub category: TaskCategory,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Earlier placements. Locked ones are kept, the rest are replaced.
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allow_split: bool,
}

impl Task {
    /// Create a task whose duration bounds equal its duration
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration: i64,
        category: TaskCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            min_duration: duration,
            max_duration: duration,
            category,
            priority: TaskPriority::default(),
            events: Vec::new(),
            deadline: None,
            allow_split: false,
        }
    }

    pub fn with_bounds(mut self, min_duration: i64, max_duration: i64) -> Self {
        self.min_duration = min_duration;
        self.max_duration = max_duration;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_split(mut self, allow_split: bool) -> Self {
        self.allow_split = allow_split;
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// Check that the duration bounds are consistent.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDuration`] naming the offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: String| ValidationError::InvalidDuration {
            field: field.to_string(),
            message,
        };

        if self.duration <= 0 {
            return Err(invalid("duration", format!("must be positive, got {}", self.duration)));
        }
        if self.min_duration <= 0 {
            return Err(invalid(
                "minDuration",
                format!("must be positive, got {}", self.min_duration),
            ));
        }
        if self.min_duration > self.max_duration {
            return Err(invalid(
                "minDuration",
                format!("{} exceeds maxDuration {}", self.min_duration, self.max_duration),
            ));
        }
        if self.min_duration > self.duration {
            return Err(invalid(
                "minDuration",
                format!("{} exceeds duration {}", self.min_duration, self.duration),
            ));
        }
        Ok(())
    }

    /// Minutes already covered by locked events
    pub fn locked_minutes(&self) -> i64 {
        self.events
            .iter()
            .filter(|e| e.locked)
            .map(|e| e.range.duration_minutes())
            .sum()
    }
}

/// A placement of (part of) a task on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub range: DateRange,
    #[serde(default)]
    pub is_past_deadline: bool,
    pub task_id: String,
    /// 1-based, set only for tasks placed in several parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_parts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
}

impl Event {
    /// New unlocked event for `task` covering `range`
    pub fn for_task(task: &Task, range: DateRange) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: task.name.clone(),
            range,
            is_past_deadline: task.deadline.is_some_and(|deadline| range.end > deadline),
            task_id: task.id.clone(),
            part_number: None,
            total_parts: None,
            priority: Some(task.priority),
            locked: false,
            category: Some(task.category),
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn duration_minutes(&self) -> i64 {
        self.range.duration_minutes()
    }
}

/// Per-category windows in which events may be placed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActiveHours {
    #[serde(default)]
    pub personal: Vec<DateRange>,
    #[serde(default)]
    pub work: Vec<DateRange>,
    #[serde(default)]
    pub meeting: Vec<DateRange>,
}

impl ActiveHours {
    pub fn for_category(&self, category: TaskCategory) -> &[DateRange] {
        match category {
            TaskCategory::Personal => &self.personal,
            TaskCategory::Work => &self.work,
            TaskCategory::Meeting => &self.meeting,
        }
    }

    /// Copy with every category list sorted, unioned and free of empty ranges
    pub fn normalized(&self) -> Self {
        Self {
            personal: merge_ranges(&self.personal),
            work: merge_ranges(&self.work),
            meeting: merge_ranges(&self.meeting),
        }
    }
}

/// Severity of a scheduling log entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Warning,
    Error,
}

/// A constraint the scheduler could not fully satisfy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Log {
    pub fn warning(task: &Task, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Warning,
            message: message.into(),
            task_id: Some(task.id.clone()),
        }
    }

    pub fn error(task: &Task, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
            task_id: Some(task.id.clone()),
        }
    }
}

/// Output of one scheduling run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleResult {
    pub events: Vec<Event>,
    pub logs: Vec<Log>,
}

impl ScheduleResult {
    pub fn events_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.task_id == task_id)
    }

    pub fn logs_at(&self, level: LogLevel) -> impl Iterator<Item = &Log> {
        self.logs.iter().filter(move |l| l.level == level)
    }

    pub fn has_errors(&self) -> bool {
        self.logs_at(LogLevel::Error).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn h(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn task_json_uses_camel_case() {
        let raw = r#"{
            "id": "t1", "name": "Write report", "duration": 120,
            "minDuration": 30, "maxDuration": 60, "category": "work",
            "priority": "high", "allowSplit": true,
            "deadline": "2024-01-02T17:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.category, TaskCategory::Work);
        assert!(task.allow_split);
        assert!(task.events.is_empty());
        assert!(task.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inconsistent_bounds() {
        let base = Task::new("t", "t", 60, TaskCategory::Work);
        assert!(base.clone().with_bounds(90, 120).validate().is_err());
        assert!(base.clone().with_bounds(45, 30).validate().is_err());
        assert!(base.clone().with_bounds(0, 30).validate().is_err());
        assert!(Task::new("t", "t", 0, TaskCategory::Work).validate().is_err());
        assert!(base.with_bounds(30, 30).validate().is_ok());
    }

    #[test]
    fn event_flags_past_deadline() {
        let task = Task::new("t", "t", 60, TaskCategory::Work).with_deadline(h(10));
        assert!(!Event::for_task(&task, DateRange::new(h(9), h(10))).is_past_deadline);
        assert!(Event::for_task(&task, DateRange::new(h(10), h(11))).is_past_deadline);
    }

    #[test]
    fn event_wire_shape() {
        let task = Task::new("t", "Deep work", 60, TaskCategory::Personal);
        let json = serde_json::to_value(Event::for_task(&task, DateRange::new(h(9), h(10)))).unwrap();
        assert_eq!(json["taskId"], "t");
        assert_eq!(json["isPastDeadline"], false);
        assert_eq!(json["category"], "personal");
        assert_eq!(json["priority"], "normal");
        assert!(json.get("partNumber").is_none());
    }

    #[test]
    fn locked_minutes_only_counts_locked() {
        let task = Task::new("t", "t", 120, TaskCategory::Work);
        let events = vec![
            Event::for_task(&task, DateRange::new(h(9), h(10))).locked(),
            Event::for_task(&task, DateRange::new(h(11), h(12))),
        ];
        assert_eq!(task.with_events(events).locked_minutes(), 60);
    }

    #[test]
    fn active_hours_normalize() {
        let hours = ActiveHours {
            work: vec![DateRange::new(h(13), h(17)), DateRange::new(h(9), h(13))],
            ..Default::default()
        };
        assert_eq!(hours.normalized().for_category(TaskCategory::Work), &[DateRange::new(h(9), h(17))]);
        assert!(hours.normalized().for_category(TaskCategory::Meeting).is_empty());
    }

    #[test]
    fn log_type_field() {
        let task = Task::new("t", "t", 60, TaskCategory::Work);
        let json = serde_json::to_value(Log::warning(&task, "late")).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["taskId"], "t");
    }
}
