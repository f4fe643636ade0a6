//! One-shot and recurring tasks running on the tokio runtime
//!
//! Each task owns a cancellation token and the join handle of its run loop.
//! `stop()` only signals the loop; an action that is already executing runs
//! to completion and the loop exits before its next wait.

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::{DomainResult, SchedulerError};
use crate::services::clock::{Clock, SystemClock};

use super::schedule::Schedule;

/// Application logic executed by a task
pub type TaskAction = Arc<dyn Fn() -> BoxFuture<'static, DomainResult<()>> + Send + Sync>;

/// Wrap an async closure as a [`TaskAction`]
pub fn task_action<F, Fut>(f: F) -> TaskAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DomainResult<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    OneShot,
    Recurring,
}

/// A named unit of scheduled work
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> TaskKind;

    /// Spawn the run loop; calling it again is a no-op
    ///
    /// Must be called from within a tokio runtime.
    fn start(&self);

    /// Signal the run loop to exit; safe at any point
    fn stop(&self);

    fn is_running(&self) -> bool;

    /// Wait for the run loop to finish
    ///
    /// An error returned by the action ends the loop and is returned here
    /// unchanged. Nothing is retried.
    async fn wait(&self) -> DomainResult<()>;
}

struct RunnerState {
    started: bool,
    cancel: CancellationToken,
    handle: Option<JoinHandle<DomainResult<()>>>,
}

/// Run-loop bookkeeping shared by both task kinds
struct TaskRunner {
    name: String,
    state: Mutex<RunnerState>,
}

impl TaskRunner {
    fn new(name: String) -> Self {
        Self {
            name,
            state: Mutex::new(RunnerState {
                started: false,
                cancel: CancellationToken::new(),
                handle: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false when the loop was already started
    fn start(&self, initial_delay: Duration, period: Option<Duration>, action: TaskAction) -> bool {
        let mut state = self.state();
        if state.started {
            debug!(task = %self.name, "Task already started");
            return false;
        }
        state.started = true;

        let name = self.name.clone();
        let cancel = state.cancel.clone();
        state.handle = Some(tokio::spawn(run_loop(
            name,
            cancel,
            initial_delay,
            period,
            action,
        )));
        true
    }

    fn stop(&self) {
        self.state().cancel.cancel();
    }

    fn is_running(&self) -> bool {
        self.state()
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn wait(&self) -> DomainResult<()> {
        let handle = self.state().handle.take();
        let Some(handle) = handle else {
            return Ok(());
        };

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(_) => {
                error!(task = %self.name, "Task panicked");
                Err(SchedulerError::TaskPanicked {
                    name: self.name.clone(),
                }
                .into())
            }
        }
    }
}

async fn run_loop(
    name: String,
    cancel: CancellationToken,
    initial_delay: Duration,
    period: Option<Duration>,
    action: TaskAction,
) -> DomainResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(task = %name, "Task stopped before first run");
            return Ok(());
        }
        _ = tokio::time::sleep(initial_delay) => {}
    }

    fire(&name, &action).await?;

    let Some(period) = period else {
        return Ok(());
    };

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        fire(&name, &action).await?;
    }

    info!(task = %name, "Task stopped");
    Ok(())
}

async fn fire(name: &str, action: &TaskAction) -> DomainResult<()> {
    debug!(task = name, "Running task");
    action().await.map_err(|e| {
        error!(task = name, error = %e, "Task action failed");
        e
    })
}

/// Runs its action exactly once, optionally after a delay
pub struct OneShotTask {
    runner: TaskRunner,
    delay: Duration,
    action: TaskAction,
}

impl OneShotTask {
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            runner: TaskRunner::new(name.into()),
            delay: Duration::ZERO,
            action,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ScheduledTask for OneShotTask {
    fn name(&self) -> &str {
        &self.runner.name
    }

    fn kind(&self) -> TaskKind {
        TaskKind::OneShot
    }

    fn start(&self) {
        self.runner.start(self.delay, None, self.action.clone());
    }

    fn stop(&self) {
        self.runner.stop();
    }

    fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    async fn wait(&self) -> DomainResult<()> {
        self.runner.wait().await
    }
}

/// Fires per its [`Schedule`] until stopped
pub struct RecurringTask {
    runner: TaskRunner,
    schedule: Arc<dyn Schedule>,
    clock: Arc<dyn Clock>,
    action: TaskAction,
}

impl RecurringTask {
    pub fn new(name: impl Into<String>, schedule: impl Schedule + 'static, action: TaskAction) -> Self {
        Self {
            runner: TaskRunner::new(name.into()),
            schedule: Arc::new(schedule),
            clock: Arc::new(SystemClock),
            action,
        }
    }

    /// Use another clock to compute the first firing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl ScheduledTask for RecurringTask {
    fn name(&self) -> &str {
        &self.runner.name
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Recurring
    }

    fn start(&self) {
        let now = self.clock.now();
        let period = self.schedule.period();
        let spawned = self
            .runner
            .start(self.schedule.initial_delay(now), Some(period), self.action.clone());
        if spawned {
            info!(
                task = %self.runner.name,
                next_fire_time = %self.schedule.next_fire_time(now),
                period_secs = period.as_secs(),
                "Scheduled recurring task"
            );
        }
    }

    fn stop(&self) {
        self.runner.stop();
    }

    fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    async fn wait(&self) -> DomainResult<()> {
        self.runner.wait().await
    }
}
