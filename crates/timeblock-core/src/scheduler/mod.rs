//! Automatic placement of tasks into active hours.
//!
//! This module turns a pool of tasks into calendar events:
//! - Orders tasks by priority, then by deadline
//! - Finds free slots in each task's category windows, avoiding locked
//!   events and everything placed earlier in the run
//! - Places whole tasks, or several parts when splitting is allowed,
//!   within each task's duration bounds
//! - Reports unmet constraints as logs; a run never fails

use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

use crate::interval::{clip_ranges, subtract_ranges, DateRange};
use crate::schedule::{ActiveHours, Event, Log, ScheduleResult, Task};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Free slots shorter than this are ignored (minutes)
    pub min_slot_minutes: i64,
    /// Keep placing after a task's deadline (events get flagged)
    pub allow_past_deadline: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_slot_minutes: 15,
            allow_past_deadline: true,
        }
    }
}

/// Automatic task scheduler
pub struct AutoScheduler {
    config: SchedulerConfig,
}

impl AutoScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Place `tasks` into `active_hours`, never before `now`.
    ///
    /// # Arguments
    /// * `tasks` - Tasks to place; their locked events are kept as-is
    /// * `active_hours` - Windows per category
    /// * `now` - Nothing new is placed before this instant
    ///
    /// # Returns
    /// Locked and newly placed events sorted by start, plus one log entry
    /// per unmet constraint
    pub fn schedule(
        &self,
        tasks: &[Task],
        active_hours: &ActiveHours,
        now: DateTime<Utc>,
    ) -> ScheduleResult {
        let hours = active_hours.normalized();

        let mut events: Vec<Event> = tasks
            .iter()
            .flat_map(|t| t.events.iter().filter(|e| e.locked))
            .cloned()
            .collect();
        let mut busy: Vec<DateRange> = events.iter().map(|e| e.range).collect();
        let mut logs = Vec::new();

        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by(|a, b| compare_tasks(a, b));

        for task in ordered {
            if let Err(err) = task.validate() {
                tracing::warn!(task = %task.id, %err, "skipping invalid task");
                logs.push(Log::error(task, format!("Task \"{}\" was not scheduled: {err}", task.name)));
                continue;
            }

            let wanted = task.duration - task.locked_minutes();
            if wanted <= 0 {
                continue;
            }

            let free = self.free_slots(task, &hours, &busy, now);
            let parts = if task.allow_split {
                split_into_slots(task, wanted, &free)
            } else {
                place_whole(task, wanted, &free).into_iter().collect()
            };

            if parts.is_empty() {
                logs.push(Log::error(
                    task,
                    format!(
                        "Task \"{}\" could not be scheduled: no free {} time fits at least {} minutes",
                        task.name,
                        task.category.as_str(),
                        task.min_duration.min(wanted)
                    ),
                ));
                continue;
            }

            let placed: i64 = parts.iter().map(DateRange::duration_minutes).sum();
            if placed < wanted {
                logs.push(Log::warning(
                    task,
                    format!(
                        "Task \"{}\" is under-allocated: {placed} of {wanted} minutes scheduled",
                        task.name
                    ),
                ));
            }

            let task_events = number_parts(parts.iter().map(|range| Event::for_task(task, *range)).collect());
            let late = task_events.iter().filter(|e| e.is_past_deadline).count();
            if late > 0 {
                logs.push(Log::warning(
                    task,
                    format!(
                        "Task \"{}\" has {late} of {} event(s) past its deadline",
                        task.name,
                        task_events.len()
                    ),
                ));
            }

            tracing::debug!(task = %task.id, parts = task_events.len(), placed, wanted, "placed task");
            busy.extend(parts);
            events.extend(task_events);
        }

        events.sort_by_key(|e| (e.range.start, e.range.end));
        tracing::info!(tasks = tasks.len(), events = events.len(), logs = logs.len(), "schedule generated");
        ScheduleResult { events, logs }
    }

    /// Free slots for `task`: its category windows from `now` on (up to the
    /// deadline when late placement is disabled), minus busy time.
    fn free_slots(
        &self,
        task: &Task,
        hours: &ActiveHours,
        busy: &[DateRange],
        now: DateTime<Utc>,
    ) -> Vec<DateRange> {
        let windows = hours.for_category(task.category);
        let Some(horizon) = windows.iter().map(|w| w.end).max() else {
            return Vec::new();
        };
        let horizon = match task.deadline {
            Some(deadline) if !self.config.allow_past_deadline => horizon.min(deadline),
            _ => horizon,
        };
        if horizon <= now {
            return Vec::new();
        }

        let open = clip_ranges(windows, &DateRange::new(now, horizon));
        subtract_ranges(&open, busy)
            .into_iter()
            .filter(|slot| slot.duration_minutes() >= self.config.min_slot_minutes)
            .collect()
    }
}

impl Default for AutoScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Priority first, then earliest deadline; tasks without one go last.
fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    b.priority
        .weight()
        .cmp(&a.priority.weight())
        .then_with(|| match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// One part in the earliest slot that fits; otherwise the longest slot of
/// at least `min_duration` (earliest on ties), compressed to its length.
fn place_whole(task: &Task, wanted: i64, free: &[DateRange]) -> Option<DateRange> {
    let target = wanted.min(task.max_duration);
    if let Some(slot) = free.iter().find(|s| s.duration_minutes() >= target) {
        return Some(DateRange::new(slot.start, slot.start + Duration::minutes(target)));
    }

    let floor = task.min_duration.min(target);
    free.iter()
        .filter(|s| s.duration_minutes() >= floor)
        .fold(None::<&DateRange>, |best, s| match best {
            Some(b) if b.duration_minutes() >= s.duration_minutes() => Some(b),
            _ => Some(s),
        })
        .map(|slot| DateRange::new(slot.start, slot.start + Duration::minutes(slot.duration_minutes())))
}

/// Fill slots earliest-first with parts of at most `max_duration`. A part
/// shorter than `min_duration` is only allowed as the final remainder.
fn split_into_slots(task: &Task, wanted: i64, free: &[DateRange]) -> Vec<DateRange> {
    let mut left = wanted;
    let mut parts = Vec::new();

    for slot in free {
        let mut cursor = slot.start;
        while left > 0 {
            let available = (slot.end - cursor).num_minutes();
            let len = available.min(left).min(task.max_duration);
            if len <= 0 || (len < task.min_duration && len < left) {
                break;
            }
            let end = cursor + Duration::minutes(len);
            parts.push(DateRange::new(cursor, end));
            cursor = end;
            left -= len;
        }
        if left == 0 {
            break;
        }
    }
    parts
}

/// Set 1-based part numbers when a task was placed in several parts.
fn number_parts(mut events: Vec<Event>) -> Vec<Event> {
    if events.len() > 1 {
        let total = u32::try_from(events.len()).unwrap_or(u32::MAX);
        for (i, event) in events.iter_mut().enumerate() {
            event.part_number = u32::try_from(i + 1).ok();
            event.total_parts = Some(total);
        }
    }
    events
}
