//! Service orchestration tests for the task lifecycle.

use std::sync::Arc;

use crate::task::{
    adapters::memory::{
        InMemoryCategoryDirectory, InMemoryHistoryLedger, InMemoryTaskRepository,
        InMemoryUserDirectory,
    },
    domain::{
        CategoryId, CategoryRef, HistoryAction, HistoryEntry, HistoryEntryId, Priority, TaskId,
        TaskStatus, UserId, UserRef,
    },
    ports::{HistoryLedger, HistoryLedgerError, HistoryLedgerResult, TaskRepository},
    services::{TaskChanges, TaskDraft, TaskLifecycleError, TaskLifecycleService},
};
use crate::test_support::{FixedClock, test_day};
use async_trait::async_trait;
use rstest::{fixture, rstest};

type TestService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryHistoryLedger,
    InMemoryCategoryDirectory,
    InMemoryUserDirectory,
    FixedClock,
>;

struct Harness {
    service: TestService,
    ledger: Arc<InMemoryHistoryLedger>,
    categories: Arc<InMemoryCategoryDirectory>,
    users: Arc<InMemoryUserDirectory>,
    owner: UserId,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let ledger = Arc::new(InMemoryHistoryLedger::new());
    let categories = Arc::new(InMemoryCategoryDirectory::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let clock = Arc::new(FixedClock::at_noon(test_day()));

    let owner = UserId::new();
    users
        .insert(UserRef::new(owner, "Ana"))
        .expect("seed user");

    let service = TaskLifecycleService::new(
        repository,
        Arc::clone(&ledger),
        Arc::clone(&categories),
        Arc::clone(&users),
        clock,
    );
    Harness {
        service,
        ledger,
        categories,
        users,
        owner,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_records_exactly_one_created_entry(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Water the plants"))
        .await
        .expect("task creation should succeed");

    let entries = harness
        .ledger
        .find_by_task(task.id(), false)
        .await
        .expect("ledger lookup");
    assert_eq!(entries.len(), 1);
    let entry = entries.first().expect("one entry");
    assert_eq!(entry.action(), HistoryAction::Created);
    assert!(entry.snapshot().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_normalizes_legacy_tokens_and_drops_bad_dates(harness: Harness) {
    let draft = TaskDraft::new("Traducir informe")
        .with_priority("alta")
        .with_status("en progreso")
        .with_due_date("not-a-date");

    let task = harness
        .service
        .create_task(harness.owner, draft)
        .await
        .expect("lenient fields must not fail the request");

    assert_eq!(task.priority(), Priority::High);
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert!(task.due_date().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_resolves_owned_categories_only(harness: Harness) {
    let category = CategoryRef::new(CategoryId::new(), "Home", "#aabbcc");
    harness
        .categories
        .insert(harness.owner, category.clone())
        .expect("seed category");

    let stranger = UserId::new();
    harness
        .users
        .insert(UserRef::new(stranger, "Luis"))
        .expect("seed user");

    let owned = harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Tidy up").with_category(category.id().to_string()),
        )
        .await
        .expect("create with owned category");
    assert_eq!(owned.category(), Some(&category));

    let foreign = harness
        .service
        .create_task(
            stranger,
            TaskDraft::new("Borrowed").with_category(category.id().to_string()),
        )
        .await
        .expect("foreign category is skipped, not an error");
    assert!(foreign.category().is_none());

    let garbled = harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Garbled").with_category("not-a-uuid"),
        )
        .await
        .expect("malformed category id is skipped");
    assert!(garbled.category().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_unknown_owners(harness: Harness) {
    let ghost = UserId::new();
    let result = harness
        .service
        .create_task(ghost, TaskDraft::new("Orphan"))
        .await;
    assert!(matches!(result, Err(TaskLifecycleError::UnknownUser(id)) if id == ghost));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_into_completed_writes_a_snapshot_entry(harness: Harness) {
    let task = harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Ship release").with_due_date("2026-03-14"),
        )
        .await
        .expect("create");

    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");

    let completions = harness
        .ledger
        .completions_for_task(task.id())
        .await
        .expect("ledger lookup");
    assert_eq!(completions.len(), 1);
    let entry = completions.first().expect("one completion");
    assert_eq!(
        entry.action(),
        HistoryAction::StatusChanged {
            from: TaskStatus::Pending,
            to: TaskStatus::Completed,
        }
    );
    let snapshot = entry.snapshot().expect("completion snapshot");
    assert_eq!(snapshot.title, "Ship release");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn re_completing_an_already_completed_task_records_an_update(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Stable"))
        .await
        .expect("create");
    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("first completion");

    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("second update");

    let completions = harness
        .ledger
        .completions_for_task(task.id())
        .await
        .expect("ledger lookup");
    assert_eq!(completions.len(), 1, "no second snapshot is captured");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_clears_category_only_on_explicit_empty(harness: Harness) {
    let category = CategoryRef::new(CategoryId::new(), "Errands", "#123456");
    harness
        .categories
        .insert(harness.owner, category.clone())
        .expect("seed category");

    let task = harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Post letters").with_category(category.id().to_string()),
        )
        .await
        .expect("create");

    let untouched = harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_title("Post letters today"),
        )
        .await
        .expect("update without category field");
    assert_eq!(untouched.category(), Some(&category));

    let cleared = harness
        .service
        .update_task(task.id(), harness.owner, TaskChanges::new().with_category(""))
        .await
        .expect("update clearing the category");
    assert!(cleared.category().is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_keeps_prior_values_for_malformed_tokens(harness: Harness) {
    let task = harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Robust")
                .with_priority("high")
                .with_due_date("2026-03-20"),
        )
        .await
        .expect("create");

    let updated = harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new()
                .with_priority("urgentisimo")
                .with_status("paused")
                .with_due_date("soon"),
        )
        .await
        .expect("malformed tokens never fail the request");

    assert_eq!(updated.priority(), Priority::High);
    assert_eq!(updated.status(), TaskStatus::Pending);
    assert_eq!(updated.due_date(), task.due_date());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_by_non_owner_reports_not_found(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Private"))
        .await
        .expect("create");

    let intruder = UserId::new();
    let result = harness
        .service
        .update_task(
            task.id(),
            intruder,
            TaskChanges::new().with_title("Hijacked"),
        )
        .await;
    assert!(matches!(result, Err(TaskLifecycleError::NotFound(id)) if id == task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_records_the_deletion_before_removing_the_task(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Disposable"))
        .await
        .expect("create");

    harness
        .service
        .delete_task(task.id(), harness.owner)
        .await
        .expect("delete");

    let missing = harness.service.find_task(task.id(), harness.owner).await;
    assert!(matches!(missing, Err(TaskLifecycleError::NotFound(_))));

    let entries = harness
        .ledger
        .find_by_task(task.id(), false)
        .await
        .expect("ledger lookup");
    let actions: Vec<HistoryAction> = entries.iter().map(|entry| entry.action()).collect();
    assert_eq!(actions, vec![HistoryAction::Created, HistoryAction::Deleted]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restore_purges_completions_and_resets_to_pending(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Yo-yo"))
        .await
        .expect("create");

    // Complete twice, re-opening in between, to accumulate two snapshots.
    for _ in 0..2 {
        harness
            .service
            .update_task(
                task.id(),
                harness.owner,
                TaskChanges::new().with_status("completed"),
            )
            .await
            .expect("complete");
        harness
            .service
            .update_task(
                task.id(),
                harness.owner,
                TaskChanges::new().with_status("pending"),
            )
            .await
            .expect("reopen");
    }
    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("final completion");

    let before = harness
        .ledger
        .completions_for_task(task.id())
        .await
        .expect("ledger lookup");
    assert_eq!(before.len(), 3);

    let restored = harness
        .service
        .restore_task(task.id(), harness.owner)
        .await
        .expect("restore");
    assert_eq!(restored.status(), TaskStatus::Pending);

    let after = harness
        .ledger
        .completions_for_task(task.id())
        .await
        .expect("ledger lookup");
    assert!(after.is_empty());

    let entries = harness
        .ledger
        .find_by_task(task.id(), false)
        .await
        .expect("ledger lookup");
    let restored_count = entries
        .iter()
        .filter(|entry| entry.action() == HistoryAction::Restored)
        .count();
    assert_eq!(restored_count, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_view_serves_the_snapshot_not_the_live_task(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Original title"))
        .await
        .expect("create");
    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");

    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_title("Edited after completion"),
        )
        .await
        .expect("post-completion edit");

    let completed = harness
        .service
        .completed_tasks(harness.owner)
        .await
        .expect("completed view");
    assert_eq!(completed.len(), 1);
    let row = completed.first().expect("one row");
    assert_eq!(row.title, "Original title");
    assert_eq!(row.task_id, task.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_view_survives_task_deletion(harness: Harness) {
    let task = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Ephemeral"))
        .await
        .expect("create");
    harness
        .service
        .update_task(
            task.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");
    harness
        .service
        .delete_task(task.id(), harness.owner)
        .await
        .expect("delete");

    let completed = harness
        .service
        .completed_tasks(harness.owner)
        .await
        .expect("completed view");
    assert_eq!(completed.len(), 1);
    let row = completed.first().expect("one row");
    assert_eq!(row.title, "Ephemeral");
    // Priority is not snapshotted; with the live task gone it falls back.
    assert_eq!(row.priority, Priority::Medium);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn active_view_excludes_completed_tasks(harness: Harness) {
    let open = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Open"))
        .await
        .expect("create");
    let done = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Done"))
        .await
        .expect("create");
    harness
        .service
        .update_task(
            done.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");

    let active = harness
        .service
        .active_tasks(harness.owner)
        .await
        .expect("active view");
    let ids: Vec<TaskId> = active.iter().map(crate::task::domain::Task::id).collect();
    assert_eq!(ids, vec![open.id()]);
}

/// Ledger double whose appends always fail, for atomicity tests.
#[derive(Debug, Clone, Default)]
struct FailingLedger;

#[async_trait]
impl HistoryLedger for FailingLedger {
    async fn append(&self, _entry: &HistoryEntry) -> HistoryLedgerResult<()> {
        Err(HistoryLedgerError::persistence(std::io::Error::other(
            "ledger offline",
        )))
    }

    async fn remove(&self, id: HistoryEntryId) -> HistoryLedgerResult<()> {
        Err(HistoryLedgerError::NotFound(id))
    }

    async fn purge_completions(&self, _task_id: TaskId) -> HistoryLedgerResult<usize> {
        Ok(0)
    }

    async fn find_by_task(
        &self,
        _task_id: TaskId,
        _newest_first: bool,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    async fn find_by_owner(&self, _owner: UserId) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    async fn completions_by_owner(
        &self,
        _owner: UserId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    async fn completions_for_task(
        &self,
        _task_id: TaskId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ledger_failure_rolls_back_task_creation() {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let owner = UserId::new();
    users.insert(UserRef::new(owner, "Ana")).expect("seed user");

    let service = TaskLifecycleService::new(
        Arc::clone(&repository),
        Arc::new(FailingLedger),
        Arc::new(InMemoryCategoryDirectory::new()),
        users,
        Arc::new(FixedClock::at_noon(test_day())),
    );

    let result = service.create_task(owner, TaskDraft::new("Doomed")).await;
    assert!(matches!(result, Err(TaskLifecycleError::Ledger(_))));

    let tasks = repository.find_by_owner(owner).await.expect("lookup");
    assert!(tasks.is_empty(), "the stored task was rolled back");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn statistics_count_active_due_today_and_completions(harness: Harness) {
    let today = test_day();

    harness
        .service
        .create_task(
            harness.owner,
            TaskDraft::new("Due today")
                .with_due_date(today.to_string())
                .with_priority("high"),
        )
        .await
        .expect("create");
    harness
        .service
        .create_task(harness.owner, TaskDraft::new("Someday"))
        .await
        .expect("create");
    let finished = harness
        .service
        .create_task(harness.owner, TaskDraft::new("Finished"))
        .await
        .expect("create");
    harness
        .service
        .update_task(
            finished.id(),
            harness.owner,
            TaskChanges::new().with_status("completed"),
        )
        .await
        .expect("complete");

    let stats = harness
        .service
        .statistics(harness.owner)
        .await
        .expect("statistics");
    assert_eq!(stats.active, 2);
    assert_eq!(stats.due_today, 1);
    assert_eq!(stats.high_priority, 1);
    assert_eq!(stats.completed_today, 1);
}
