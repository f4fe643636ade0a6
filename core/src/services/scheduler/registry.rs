//! Named collection of scheduled tasks

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

use super::task::ScheduledTask;

/// Owns every scheduled task of the process, keyed by name
///
/// Adding a task whose name is already registered stops and replaces the
/// previous one.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, Arc<dyn ScheduledTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn ScheduledTask>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a task, returning the one it replaced
    ///
    /// # Arguments
    ///
    /// * `task` - Task to own; it is not started here
    ///
    /// # Returns
    ///
    /// The previous task under the same name, already stopped, if any
    pub fn add_task(&self, task: Arc<dyn ScheduledTask>) -> Option<Arc<dyn ScheduledTask>> {
        let name = task.name().to_string();
        let previous = self.tasks().insert(name.clone(), task);
        if let Some(previous) = &previous {
            previous.stop();
            info!(task = %name, "Replaced scheduled task");
        }
        previous
    }

    /// Stop and unregister a task
    ///
    /// # Returns
    ///
    /// Whether a task with that name was registered
    pub fn remove_task(&self, name: &str) -> bool {
        match self.tasks().remove(name) {
            Some(task) => {
                task.stop();
                info!(task = %name, "Removed scheduled task");
                true
            }
            None => false,
        }
    }

    /// Start every registered task
    ///
    /// Tasks that are already running are left alone.
    pub fn run_tasks(&self) {
        for task in self.snapshot() {
            task.start();
        }
    }

    pub fn stop_all(&self) {
        for task in self.snapshot() {
            task.stop();
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ScheduledTask>> {
        self.tasks().get(name).cloned()
    }

    /// Registered names, sorted
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn ScheduledTask>> {
        self.tasks().values().cloned().collect()
    }
}
