//! Scheduled sweep reclassifying overdue tasks as incomplete.

use crate::task::{
    domain::TaskStatus,
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Batch job that marks overdue tasks incomplete.
///
/// A task qualifies when it carries a due date strictly before today and
/// is neither completed nor already incomplete, so re-running the sweep is
/// a no-op. Each status flip is its own store round-trip; a failure on one
/// task is logged and the scan continues.
///
/// The sweep deliberately writes no history entry: reclassification is a
/// system-driven bookkeeping step, not a user action.
#[derive(Clone)]
pub struct OverdueSweeper<R, K>
where
    R: TaskRepository,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<K>,
}

impl<R, K> OverdueSweeper<R, K>
where
    R: TaskRepository,
    K: Clock + Send + Sync,
{
    /// Creates a new sweeper.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<K>) -> Self {
        Self { repository, clock }
    }

    /// Runs one sweep over all tasks and returns the number reclassified.
    ///
    /// Also exposed for manual operational invocation; the scheduler calls
    /// it once per day.
    pub async fn run(&self) -> usize {
        let today = self.clock.utc().date_naive();
        info!(%today, "starting overdue task sweep");

        let tasks = match self.repository.list_all().await {
            Ok(tasks) => tasks,
            Err(err) => {
                error!(error = %err, "overdue sweep could not list tasks");
                return 0;
            }
        };

        let mut reclassified = 0;
        for mut task in tasks {
            if !task.is_overdue(today) {
                continue;
            }
            info!(
                task_id = %task.id(),
                title = task.title(),
                due_date = ?task.due_date(),
                "marking overdue task incomplete"
            );
            task.set_status(TaskStatus::Incomplete);
            match self.repository.update(&task).await {
                Ok(()) => reclassified += 1,
                Err(err) => {
                    warn!(
                        task_id = %task.id(),
                        error = %err,
                        "failed to reclassify overdue task; continuing sweep"
                    );
                }
            }
        }

        info!(reclassified, "overdue task sweep finished");
        reclassified
    }
}
