//! Cooperative task scheduling on the tokio runtime

pub mod registry;
pub mod schedule;
pub mod task;

pub use registry::TaskRegistry;
pub use schedule::{DailySchedule, Schedule, ONE_DAY};
pub use task::{task_action, OneShotTask, RecurringTask, ScheduledTask, TaskAction, TaskKind};
