//! Scoped poll timer.
//!
//! One `PollHandle` per mounted shell. Dropping the handle aborts the
//! timer task, so a remounted shell never leaves a second poll running.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::session::{NotificationSession, RefreshOutcome};
use super::store::NotificationStore;

pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Refresh `session` every `period`, first tick one period from now.
    pub fn spawn<S: NotificationStore>(session: NotificationSession<S>, period: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if session.is_closed() {
                    break;
                }
                if let RefreshOutcome::Applied { count } = session.refresh().await {
                    tracing::trace!(count, "Poll refresh applied");
                }
            }
            tracing::debug!("Poll timer stopped");
        });

        tracing::debug!(period_secs = period.as_secs(), "Poll timer started");
        Self { task }
    }

    /// Stop the timer. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
