//! Tests for notification generation, dismissal, and window boundaries.

use std::sync::Arc;

use crate::notification::{
    adapters::memory::InMemoryNotificationRepository,
    domain::{Notification, NotificationKind},
    ports::NotificationRepository,
    services::{NotificationService, NotificationServiceError},
};
use crate::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Task, TaskStatus, UserId, UserRef},
    ports::TaskRepository,
};
use crate::test_support::{FixedClock, test_day};
use chrono::Days;
use rstest::{fixture, rstest};

type TestService = NotificationService<
    InMemoryNotificationRepository,
    InMemoryTaskRepository,
    InMemoryUserDirectory,
    FixedClock,
>;

struct Harness {
    service: TestService,
    notifications: Arc<InMemoryNotificationRepository>,
    tasks: Arc<InMemoryTaskRepository>,
    users: Arc<InMemoryUserDirectory>,
    clock: FixedClock,
    owner: UserId,
}

#[fixture]
fn harness() -> Harness {
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let clock = FixedClock::at_noon(test_day());

    let owner = UserId::new();
    users.insert(UserRef::new(owner, "Ana")).expect("seed user");

    let service = NotificationService::new(
        Arc::clone(&notifications),
        Arc::clone(&tasks),
        Arc::clone(&users),
        Arc::new(clock),
    );
    Harness {
        service,
        notifications,
        tasks,
        users,
        clock,
        owner,
    }
}

async fn seed_task(
    harness: &Harness,
    owner: UserId,
    title: &str,
    due_in_days: Option<u64>,
    status: TaskStatus,
) -> Task {
    let mut task = Task::new(owner, title, &harness.clock).expect("valid task");
    if let Some(days) = due_in_days {
        task.set_due_date(harness.clock.today().checked_add_days(Days::new(days)));
    }
    task.set_status(status);
    harness.tasks.store(&task).await.expect("seed task");
    task
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upcoming_window_is_inclusive_on_both_ends(harness: Harness) {
    seed_task(&harness, harness.owner, "Today", Some(0), TaskStatus::Pending).await;
    seed_task(
        &harness,
        harness.owner,
        "Horizon",
        Some(3),
        TaskStatus::Pending,
    )
    .await;
    seed_task(
        &harness,
        harness.owner,
        "Beyond",
        Some(4),
        TaskStatus::Pending,
    )
    .await;

    let created = harness
        .service
        .generate_for_user(harness.owner)
        .await
        .expect("generation");

    assert_eq!(created, 2);
    let stored = harness
        .notifications
        .find_by_owner(harness.owner)
        .await
        .expect("lookup");
    assert!(stored.iter().all(|n| n.kind() == NotificationKind::UpcomingDue));
    assert!(
        stored
            .iter()
            .any(|n| n.message().contains("Today")),
        "task due today is inside the window"
    );
    assert!(
        stored
            .iter()
            .any(|n| n.message().contains("Horizon")),
        "task due in exactly three days is inside the window"
    );
    assert!(
        stored.iter().all(|n| !n.message().contains("Beyond")),
        "task due in four days is outside the window"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn settled_tasks_never_produce_upcoming_alerts(harness: Harness) {
    seed_task(
        &harness,
        harness.owner,
        "Finished",
        Some(1),
        TaskStatus::Completed,
    )
    .await;

    let created = harness
        .service
        .generate_for_user(harness.owner)
        .await
        .expect("generation");
    assert_eq!(created, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn incomplete_tasks_produce_overdue_alerts_with_the_due_date(harness: Harness) {
    let mut task = Task::new(harness.owner, "Missed it", &harness.clock).expect("valid task");
    task.set_due_date(harness.clock.today().checked_sub_days(Days::new(2)));
    task.set_status(TaskStatus::Incomplete);
    harness.tasks.store(&task).await.expect("seed task");

    let created = harness
        .service
        .generate_for_user(harness.owner)
        .await
        .expect("generation");

    assert_eq!(created, 1);
    let stored = harness
        .notifications
        .find_by_owner(harness.owner)
        .await
        .expect("lookup");
    let alert = stored.first().expect("one alert");
    assert_eq!(alert.kind(), NotificationKind::Overdue);
    assert_eq!(alert.task_id(), Some(task.id()));
    assert!(alert.message().contains("Missed it"));
    assert!(alert.message().contains("2026-03-08"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_on_demand_generation_accumulates_duplicates(harness: Harness) {
    seed_task(
        &harness,
        harness.owner,
        "Repeat",
        Some(1),
        TaskStatus::Pending,
    )
    .await;

    harness
        .service
        .generate_for_user(harness.owner)
        .await
        .expect("first run");
    harness
        .service
        .generate_for_user(harness.owner)
        .await
        .expect("second run");

    let stored = harness
        .notifications
        .find_by_owner(harness.owner)
        .await
        .expect("lookup");
    assert_eq!(stored.len(), 2, "no deduplication is performed");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn generate_for_unknown_user_is_an_error(harness: Harness) {
    let ghost = UserId::new();
    let result = harness.service.generate_for_user(ghost).await;
    assert!(matches!(
        result,
        Err(NotificationServiceError::UnknownUser(id)) if id == ghost
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn automatic_generation_aggregates_per_user_and_category(harness: Harness) {
    // Owner: two upcoming and one overdue task -> two aggregate alerts.
    seed_task(&harness, harness.owner, "One", Some(1), TaskStatus::Pending).await;
    seed_task(&harness, harness.owner, "Two", Some(2), TaskStatus::Pending).await;
    seed_task(
        &harness,
        harness.owner,
        "Late",
        Some(0),
        TaskStatus::Incomplete,
    )
    .await;

    // Second user: nothing due -> no alerts at all.
    let idle_user = UserId::new();
    harness
        .users
        .insert(UserRef::new(idle_user, "Luis"))
        .expect("seed user");

    let created = harness
        .service
        .generate_automatic()
        .await
        .expect("automatic sweep");
    assert_eq!(created, 2);

    let owner_alerts = harness
        .notifications
        .find_by_owner(harness.owner)
        .await
        .expect("lookup");
    assert_eq!(owner_alerts.len(), 2);
    assert!(
        owner_alerts
            .iter()
            .any(|n| n.kind() == NotificationKind::UpcomingDue
                && n.message() == "You have 2 task(s) due in the next 3 days")
    );
    assert!(
        owner_alerts
            .iter()
            .any(|n| n.kind() == NotificationKind::Overdue
                && n.message() == "You have 1 overdue task(s)")
    );
    assert!(
        owner_alerts.iter().all(|n| n.task_id().is_none()),
        "aggregate alerts reference no single task"
    );

    let idle_alerts = harness
        .notifications
        .find_by_owner(idle_user)
        .await
        .expect("lookup");
    assert!(idle_alerts.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_read_is_scoped_to_the_owner(harness: Harness) {
    let alert = Notification::new(
        harness.owner,
        NotificationKind::UpcomingDue,
        "Heads up",
        &harness.clock,
    );
    harness.notifications.store(&alert).await.expect("seed");

    let intruder = UserId::new();
    let denied = harness.service.mark_read(alert.id(), intruder).await;
    assert!(matches!(
        denied,
        Err(NotificationServiceError::NotFound(id)) if id == alert.id()
    ));

    harness
        .service
        .mark_read(alert.id(), harness.owner)
        .await
        .expect("owner can mark read");
    assert_eq!(
        harness
            .service
            .unread_count(harness.owner)
            .await
            .expect("count"),
        0
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clear_read_removes_only_read_notifications(harness: Harness) {
    let read_alert = Notification::new(
        harness.owner,
        NotificationKind::Overdue,
        "Old news",
        &harness.clock,
    );
    harness.notifications.store(&read_alert).await.expect("seed");
    harness
        .service
        .mark_read(read_alert.id(), harness.owner)
        .await
        .expect("mark read");

    let fresh_alert = Notification::new(
        harness.owner,
        NotificationKind::UpcomingDue,
        "Still unread",
        &harness.clock,
    );
    harness.notifications.store(&fresh_alert).await.expect("seed");

    let removed = harness
        .service
        .clear_read(harness.owner)
        .await
        .expect("clear read");
    assert_eq!(removed, 1);

    let remaining = harness
        .service
        .list_for_user(harness.owner)
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining.first().expect("one left").id(),
        fresh_alert.id()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_all_read_flips_every_unread_alert(harness: Harness) {
    for message in ["a", "b", "c"] {
        let alert = Notification::new(
            harness.owner,
            NotificationKind::UpcomingDue,
            message,
            &harness.clock,
        );
        harness.notifications.store(&alert).await.expect("seed");
    }

    let changed = harness
        .service
        .mark_all_read(harness.owner)
        .await
        .expect("mark all");
    assert_eq!(changed, 3);
    assert_eq!(
        harness
            .service
            .unread_count(harness.owner)
            .await
            .expect("count"),
        0
    );
}
