//! Behavioural integration tests for the task lifecycle engine.
//!
//! These tests wire the in-memory adapters into the real services and walk
//! the flows end to end: creation, completion snapshots, restore, the
//! overdue sweep, and notification generation.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use bitacora::notification::{
    adapters::memory::InMemoryNotificationRepository, domain::NotificationKind,
    ports::NotificationRepository, services::NotificationService,
};
use bitacora::task::{
    adapters::memory::{
        InMemoryCategoryDirectory, InMemoryHistoryLedger, InMemoryTaskRepository,
        InMemoryUserDirectory,
    },
    domain::{TaskStatus, UserId, UserRef},
    services::{OverdueSweeper, TaskChanges, TaskDraft, TaskLifecycleService},
};
use chrono::{Days, Utc};
use mockable::DefaultClock;

type Lifecycle = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryHistoryLedger,
    InMemoryCategoryDirectory,
    InMemoryUserDirectory,
    DefaultClock,
>;

struct World {
    lifecycle: Lifecycle,
    sweeper: OverdueSweeper<InMemoryTaskRepository, DefaultClock>,
    notifications: NotificationService<
        InMemoryNotificationRepository,
        InMemoryTaskRepository,
        InMemoryUserDirectory,
        DefaultClock,
    >,
    notification_store: Arc<InMemoryNotificationRepository>,
    owner: UserId,
}

fn world() -> World {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let ledger = Arc::new(InMemoryHistoryLedger::new());
    let categories = Arc::new(InMemoryCategoryDirectory::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let notification_store = Arc::new(InMemoryNotificationRepository::new());
    let clock = Arc::new(DefaultClock);

    let owner = UserId::new();
    users.insert(UserRef::new(owner, "Ana")).expect("seed user");

    World {
        lifecycle: TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&ledger),
            categories,
            Arc::clone(&users),
            Arc::clone(&clock),
        ),
        sweeper: OverdueSweeper::new(Arc::clone(&repository), Arc::clone(&clock)),
        notifications: NotificationService::new(
            Arc::clone(&notification_store),
            repository,
            users,
            clock,
        ),
        notification_store,
        owner,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_edit_and_restore_round_trip() {
    let world = world();

    let task = world
        .lifecycle
        .create_task(world.owner, TaskDraft::new("Write the summary"))
        .await
        .expect("create");

    world
        .lifecycle
        .update_task(
            task.id(),
            world.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");

    // Post-completion edit must not leak into the completed view.
    world
        .lifecycle
        .update_task(
            task.id(),
            world.owner,
            TaskChanges::new().with_title("Rewritten afterwards"),
        )
        .await
        .expect("edit");

    let completed = world
        .lifecycle
        .completed_tasks(world.owner)
        .await
        .expect("completed view");
    assert_eq!(completed.len(), 1);
    assert_eq!(
        completed.first().expect("one row").title,
        "Write the summary"
    );

    let restored = world
        .lifecycle
        .restore_task(task.id(), world.owner)
        .await
        .expect("restore");
    assert_eq!(restored.status(), TaskStatus::Pending);

    let after_restore = world
        .lifecycle
        .completed_tasks(world.owner)
        .await
        .expect("completed view");
    assert!(after_restore.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn sweep_then_generate_flags_and_reports_the_overdue_task() {
    let world = world();
    let today = Utc::now().date_naive();
    let yesterday = today
        .checked_sub_days(Days::new(1))
        .expect("valid date")
        .to_string();
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .expect("valid date")
        .to_string();

    let missed = world
        .lifecycle
        .create_task(
            world.owner,
            TaskDraft::new("Missed deadline").with_due_date(yesterday),
        )
        .await
        .expect("create");
    world
        .lifecycle
        .create_task(
            world.owner,
            TaskDraft::new("Due soon").with_due_date(tomorrow),
        )
        .await
        .expect("create");
    world
        .lifecycle
        .create_task(world.owner, TaskDraft::new("No deadline"))
        .await
        .expect("create");

    let reclassified = world.sweeper.run().await;
    assert_eq!(reclassified, 1);
    let flagged = world
        .lifecycle
        .find_task(missed.id(), world.owner)
        .await
        .expect("lookup");
    assert_eq!(flagged.status(), TaskStatus::Incomplete);

    // Second sweep is a no-op.
    assert_eq!(world.sweeper.run().await, 0);

    let created = world
        .notifications
        .generate_for_user(world.owner)
        .await
        .expect("generation");
    assert_eq!(created, 2);

    let alerts = world
        .notification_store
        .find_by_owner(world.owner)
        .await
        .expect("lookup");
    assert!(
        alerts
            .iter()
            .any(|alert| alert.kind() == NotificationKind::Overdue
                && alert.message().contains("Missed deadline"))
    );
    assert!(
        alerts
            .iter()
            .any(|alert| alert.kind() == NotificationKind::UpcomingDue
                && alert.message().contains("Due soon"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_survive_in_history() {
    let world = world();

    let task = world
        .lifecycle
        .create_task(world.owner, TaskDraft::new("Short lived"))
        .await
        .expect("create");
    world
        .lifecycle
        .update_task(
            task.id(),
            world.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");
    world
        .lifecycle
        .delete_task(task.id(), world.owner)
        .await
        .expect("delete");

    let history = world
        .lifecycle
        .history_for_task(task.id(), world.owner)
        .await
        .expect("history");
    assert_eq!(history.len(), 3, "created, completed, and deleted entries");

    let completed = world
        .lifecycle
        .completed_tasks(world.owner)
        .await
        .expect("completed view");
    assert_eq!(
        completed.first().expect("snapshot row").title,
        "Short lived"
    );
}
