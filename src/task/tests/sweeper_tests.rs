//! Tests for the overdue sweep.

use std::sync::Arc;

use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskStatus, UserId},
    ports::TaskRepository,
    services::OverdueSweeper,
};
use crate::test_support::{FixedClock, test_day};
use chrono::Days;
use eyre::ensure;
use rstest::{fixture, rstest};

struct Harness {
    repository: Arc<InMemoryTaskRepository>,
    sweeper: OverdueSweeper<InMemoryTaskRepository, FixedClock>,
    clock: FixedClock,
    owner: UserId,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let clock = FixedClock::at_noon(test_day());
    let sweeper = OverdueSweeper::new(Arc::clone(&repository), Arc::new(clock));
    Harness {
        repository,
        sweeper,
        clock,
        owner: UserId::new(),
    }
}

async fn seed_task(
    harness: &Harness,
    title: &str,
    due_offset_days: Option<i64>,
    status: TaskStatus,
) -> eyre::Result<Task> {
    let mut task = Task::new(harness.owner, title, &harness.clock)?;
    if let Some(offset) = due_offset_days {
        let due = if offset < 0 {
            harness
                .clock
                .today()
                .checked_sub_days(Days::new(offset.unsigned_abs()))
        } else {
            harness
                .clock
                .today()
                .checked_add_days(Days::new(offset.unsigned_abs()))
        };
        task.set_due_date(due);
    }
    task.set_status(status);
    harness.repository.store(&task).await?;
    Ok(task)
}

async fn status_of(harness: &Harness, task: &Task) -> eyre::Result<TaskStatus> {
    let found = harness.repository.find_by_id(task.id()).await?;
    found
        .map(|current| current.status())
        .ok_or_else(|| eyre::eyre!("task {} missing from the store", task.id()))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_reclassifies_strictly_past_due_active_tasks(harness: Harness) -> eyre::Result<()> {
    let overdue = seed_task(&harness, "Late", Some(-1), TaskStatus::Pending).await?;
    let in_progress = seed_task(&harness, "Also late", Some(-5), TaskStatus::InProgress).await?;

    let reclassified = harness.sweeper.run().await;

    ensure!(reclassified == 2);
    ensure!(status_of(&harness, &overdue).await? == TaskStatus::Incomplete);
    ensure!(status_of(&harness, &in_progress).await? == TaskStatus::Incomplete);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_leaves_tasks_due_today_alone(harness: Harness) -> eyre::Result<()> {
    let due_today = seed_task(&harness, "On the wire", Some(0), TaskStatus::Pending).await?;

    let reclassified = harness.sweeper.run().await;

    ensure!(reclassified == 0);
    ensure!(status_of(&harness, &due_today).await? == TaskStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_skips_settled_and_undated_tasks(harness: Harness) -> eyre::Result<()> {
    let completed = seed_task(&harness, "Done", Some(-2), TaskStatus::Completed).await?;
    let incomplete =
        seed_task(&harness, "Already flagged", Some(-2), TaskStatus::Incomplete).await?;
    let undated = seed_task(&harness, "No deadline", None, TaskStatus::Pending).await?;

    let reclassified = harness.sweeper.run().await;

    ensure!(reclassified == 0);
    ensure!(status_of(&harness, &completed).await? == TaskStatus::Completed);
    ensure!(status_of(&harness, &incomplete).await? == TaskStatus::Incomplete);
    ensure!(status_of(&harness, &undated).await? == TaskStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_is_idempotent(harness: Harness) -> eyre::Result<()> {
    seed_task(&harness, "Late", Some(-1), TaskStatus::Pending).await?;
    seed_task(&harness, "Future", Some(3), TaskStatus::Pending).await?;

    let first = harness.sweeper.run().await;
    let incomplete_after_first = harness.repository.find_incomplete(harness.owner).await?;

    let second = harness.sweeper.run().await;
    let incomplete_after_second = harness.repository.find_incomplete(harness.owner).await?;

    ensure!(first == 1);
    ensure!(second == 0);
    ensure!(incomplete_after_first == incomplete_after_second);
    Ok(())
}
