//! Recurring reminder tick.
//!
//! The scheduler only produces ticks; whoever owns the store handles them on
//! its own thread. The task is aborted on `stop` and on drop.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

pub struct ReminderScheduler {
    task: Option<JoinHandle<()>>,
    period: Duration,
}

impl ReminderScheduler {
    /// Spawn a task on `handle` that calls `tick` every `period`, starting one
    /// period from now. Ticks that fall behind are skipped, not bunched.
    pub fn start<F>(handle: &Handle, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        debug!(period_ms = period.as_millis() as u64, "reminder scheduler started");
        let task = handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick();
            }
        });
        Self {
            task: Some(task),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("reminder scheduler stopped");
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
