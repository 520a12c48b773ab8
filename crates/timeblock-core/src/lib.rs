//! # Timeblock Core Library
//!
//! Availability intervals and task auto-scheduling for meeting coordination
//! and calendar planning. Every operation is a pure, synchronous
//! transformation over in-memory collections; callers own persistence.
//!
//! ## Architecture
//!
//! - **Timeblock Engine**: union and subtraction of timezone-aware daily
//!   availability blocks, and drag-gesture expansion
//! - **Interval helpers**: absolute date-range union/subtraction used for
//!   active-hour windows
//! - **Scheduler**: priority- and deadline-ordered placement of tasks into
//!   category windows, reporting unmet constraints as logs
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimeblockEngine`]: Merge/remove/expand timeblocks
//! - [`AutoScheduler`]: Task placement
//! - [`TemplateScenario`]: JSON scheduling inputs
//! - [`Config`]: Application configuration management

pub mod error;
pub mod interval;
pub mod scenario;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeblock;

pub use error::{ConfigError, CoreError, ValidationError};
pub use interval::{merge_ranges, subtract_ranges, DateRange};
pub use scenario::TemplateScenario;
pub use schedule::{ActiveHours, Event, Log, LogLevel, ScheduleResult, Task, TaskCategory, TaskPriority};
pub use scheduler::{AutoScheduler, SchedulerConfig};
pub use storage::Config;
pub use timeblock::{
    add_timeblocks, date_matrix, duration_to_timeblocks, remove_timeblocks, time_matrix, DateTimeMatrix,
    OffsetAware, TimeOfDayTz, Timeblock, TimeblockConfig, TimeblockEngine, TimetzOrdering,
};
