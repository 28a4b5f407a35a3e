//! Service layer orchestrating task mutation and the history ledger.
//!
//! Every external mutation of a task flows through
//! [`TaskLifecycleService`], which normalizes incoming fields, persists the
//! task, and appends the matching history entry. Store and ledger writes
//! within one operation are kept all-or-nothing with compensating writes:
//! a ledger failure undoes the store write and vice versa.

use crate::task::{
    domain::{
        CategoryId, CategoryRef, HistoryEntry, HistoryEntryId, Priority, Task, TaskDomainError,
        TaskId, TaskStatus, UserId, parse_due_date,
    },
    ports::{
        CategoryDirectory, DirectoryError, HistoryLedger, HistoryLedgerError, TaskRepository,
        TaskRepositoryError, UserDirectory,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Incoming fields for task creation.
///
/// Status, priority, due date, and category arrive as free-text tokens and
/// are normalized leniently: unrecognized values fall back to defaults
/// rather than failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    category_id: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw due-date token.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Sets the raw priority token.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the raw status token.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the raw category identifier.
    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Partial update for an existing task.
///
/// Fields left as `None` keep their prior value. An explicitly empty
/// `category_id` clears the category reference, distinct from an absent
/// field which leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskChanges {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    category_id: Option<String>,
}

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw due-date token.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Sets the raw priority token.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the raw status token.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the raw category identifier. Pass an empty string to clear the
    /// category.
    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// A completed-task view row, reconstructed from the ledger's completion
/// snapshot rather than from live task state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    /// Identifier of the completed task.
    pub task_id: TaskId,
    /// Identifier of the backing ledger entry.
    pub history_id: HistoryEntryId,
    /// Title at completion time.
    pub title: String,
    /// Description at completion time.
    pub description: Option<String>,
    /// Category name at completion time.
    pub category_name: Option<String>,
    /// Due date at completion time.
    pub due_date: Option<NaiveDate>,
    /// Start date at completion time.
    pub start_date: NaiveDate,
    /// Priority of the live task when it still exists, `Medium` otherwise.
    /// Priority is not part of the snapshot.
    pub priority: Priority,
    /// When the completion was recorded.
    pub completed_at: DateTime<Utc>,
}

/// Dashboard counters for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    /// Tasks that are neither completed nor incomplete.
    pub active: u64,
    /// Not-completed tasks due today.
    pub due_today: u64,
    /// Not-completed high-priority tasks.
    pub high_priority: u64,
    /// Completions recorded today.
    pub completed_today: u64,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The task does not exist or belongs to another user. Ownership
    /// mismatches are reported as not-found to avoid leaking existence.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The acting user is not registered.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task store operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// History ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] HistoryLedgerError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, L, G, U, K>
where
    R: TaskRepository,
    L: HistoryLedger,
    G: CategoryDirectory,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    ledger: Arc<L>,
    categories: Arc<G>,
    users: Arc<U>,
    clock: Arc<K>,
}

impl<R, L, G, U, K> TaskLifecycleService<R, L, G, U, K>
where
    R: TaskRepository,
    L: HistoryLedger,
    G: CategoryDirectory,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        ledger: Arc<L>,
        categories: Arc<G>,
        users: Arc<U>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            repository,
            ledger,
            categories,
            users,
            clock,
        }
    }

    /// Creates a task for the given owner and records the creation in the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::UnknownUser`] when the owner is not
    /// registered, [`TaskLifecycleError::Domain`] when the title is empty,
    /// or a repository/ledger error when persistence fails. A ledger
    /// failure rolls the stored task back.
    pub async fn create_task(
        &self,
        owner_id: UserId,
        draft: TaskDraft,
    ) -> TaskLifecycleResult<Task> {
        let owner = self
            .users
            .find_by_id(owner_id)
            .await?
            .ok_or(TaskLifecycleError::UnknownUser(owner_id))?;

        let mut task = Task::new(owner.id(), draft.title, &*self.clock)?;
        if let Some(description) = draft.description {
            task.set_description(non_empty(description));
        }
        if let Some(raw_due) = draft.due_date
            && !raw_due.trim().is_empty()
        {
            task.set_due_date(parse_due_date(&raw_due));
        }
        if let Some(raw_priority) = draft.priority
            && let Ok(priority) = Priority::try_from(raw_priority.as_str())
        {
            task.set_priority(priority);
        }
        if let Some(raw_status) = draft.status
            && let Ok(status) = TaskStatus::try_from(raw_status.as_str())
        {
            task.set_status(status);
        }
        if let Some(raw_category) = draft.category_id
            && !raw_category.trim().is_empty()
        {
            task.set_category(self.resolve_category(owner_id, &raw_category).await);
        }

        self.repository.store(&task).await?;

        let entry = HistoryEntry::created(&task, owner_id, &*self.clock);
        if let Err(err) = self.ledger.append(&entry).await {
            if let Err(rollback_err) = self.repository.delete(task.id()).await {
                error!(
                    task_id = %task.id(),
                    error = %rollback_err,
                    "failed to roll back task creation after ledger failure"
                );
            }
            return Err(err.into());
        }
        Ok(task)
    }

    /// Applies a partial update and records the resulting transition.
    ///
    /// A transition into completed captures the completion snapshot; any
    /// other status change is recorded as a plain transition; an edit
    /// without a status change is recorded as an update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing
    /// or owned by another user, or a repository/ledger error when
    /// persistence fails. A ledger failure restores the previous record.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        owner_id: UserId,
        changes: TaskChanges,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_owned(task_id, owner_id).await?;
        let previous = task.clone();
        let previous_status = task.status();

        if let Some(title) = changes.title
            && task.set_title(title).is_err()
        {
            warn!(task_id = %task_id, "ignoring empty title in task update");
        }
        if let Some(description) = changes.description {
            task.set_description(non_empty(description));
        }
        if let Some(raw_due) = changes.due_date
            && !raw_due.trim().is_empty()
            && let Some(due) = parse_due_date(&raw_due)
        {
            task.set_due_date(Some(due));
        }
        if let Some(raw_priority) = changes.priority
            && let Ok(priority) = Priority::try_from(raw_priority.as_str())
        {
            task.set_priority(priority);
        }
        if let Some(raw_status) = changes.status
            && let Ok(status) = TaskStatus::try_from(raw_status.as_str())
        {
            task.set_status(status);
        }
        match changes.category_id {
            None => {}
            Some(raw_category) if raw_category.trim().is_empty() => {
                task.set_category(None);
            }
            Some(raw_category) => {
                if let Some(category) = self.resolve_category(owner_id, &raw_category).await {
                    task.set_category(Some(category));
                }
            }
        }

        self.repository.update(&task).await?;

        let entry = if task.status() == previous_status {
            HistoryEntry::updated(&task, owner_id, &*self.clock)
        } else {
            HistoryEntry::status_changed(
                &task,
                owner_id,
                previous_status,
                task.status(),
                &*self.clock,
            )
        };
        if let Err(err) = self.ledger.append(&entry).await {
            if let Err(rollback_err) = self.repository.update(&previous).await {
                error!(
                    task_id = %task_id,
                    error = %rollback_err,
                    "failed to roll back task update after ledger failure"
                );
            }
            return Err(err.into());
        }
        Ok(task)
    }

    /// Records the deletion in the ledger, then removes the task.
    ///
    /// The ledger entry is written first so a deleted task's data remains
    /// queryable; it is discarded again if the store delete fails.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing
    /// or owned by another user, or a repository/ledger error when
    /// persistence fails.
    pub async fn delete_task(&self, task_id: TaskId, owner_id: UserId) -> TaskLifecycleResult<()> {
        let task = self.load_owned(task_id, owner_id).await?;

        let entry = HistoryEntry::deleted(&task, owner_id, &*self.clock);
        self.ledger.append(&entry).await?;

        if let Err(err) = self.repository.delete(task_id).await {
            if let Err(rollback_err) = self.ledger.remove(entry.id()).await {
                error!(
                    task_id = %task_id,
                    error = %rollback_err,
                    "failed to discard deletion entry after store failure"
                );
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Resets a task to pending, purges its completion entries, and
    /// records the restoration.
    ///
    /// Restoring invalidates the task's "was completed" history, so every
    /// prior completion snapshot for the task is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing
    /// or owned by another user, or a repository/ledger error when
    /// persistence fails.
    pub async fn restore_task(
        &self,
        task_id: TaskId,
        owner_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_owned(task_id, owner_id).await?;
        let previous = task.clone();

        task.set_status(TaskStatus::Pending);
        self.repository.update(&task).await?;

        let purged = match self.ledger.purge_completions(task_id).await {
            Ok(count) => count,
            Err(err) => {
                if let Err(rollback_err) = self.repository.update(&previous).await {
                    error!(
                        task_id = %task_id,
                        error = %rollback_err,
                        "failed to roll back task restore after ledger failure"
                    );
                }
                return Err(err.into());
            }
        };

        let entry = HistoryEntry::restored(&task, owner_id, &*self.clock);
        if let Err(err) = self.ledger.append(&entry).await {
            // The purge cannot be undone; surface the failure loudly.
            error!(
                task_id = %task_id,
                purged,
                error = %err,
                "restore entry append failed after purging completion history"
            );
            return Err(err.into());
        }

        info!(task_id = %task_id, purged, "task restored to pending");
        Ok(task)
    }

    /// Returns one owner-scoped task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing
    /// or owned by another user.
    pub async fn find_task(&self, task_id: TaskId, owner_id: UserId) -> TaskLifecycleResult<Task> {
        self.load_owned(task_id, owner_id).await
    }

    /// Returns all tasks owned by the user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn tasks_for(&self, owner_id: UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }

    /// Returns the owner's tasks that are not completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn active_tasks(&self, owner_id: UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self
            .repository
            .find_by_owner_excluding_status(owner_id, TaskStatus::Completed)
            .await?)
    }

    /// Returns the owner's completed tasks, served from ledger snapshots.
    ///
    /// The view survives later edits and deletion of the live task: the
    /// returned titles and dates are the snapshot values, not the current
    /// record. Priority is not snapshotted and falls back to the live
    /// task's value while it exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Ledger`] or
    /// [`TaskLifecycleError::Repository`] when a lookup fails.
    pub async fn completed_tasks(&self, owner_id: UserId) -> TaskLifecycleResult<Vec<CompletedTask>> {
        let entries = self.ledger.completions_by_owner(owner_id).await?;
        let mut completed = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(snapshot) = entry.snapshot() else {
                warn!(entry_id = %entry.id(), "completion entry without snapshot; skipping");
                continue;
            };
            let live = self.repository.find_by_id(entry.task_id()).await?;
            completed.push(CompletedTask {
                task_id: entry.task_id(),
                history_id: entry.id(),
                title: snapshot.title.clone(),
                description: snapshot.description.clone(),
                category_name: snapshot.category_name.clone(),
                due_date: snapshot.due_date,
                start_date: snapshot.start_date,
                priority: live.map_or_else(Priority::default, |task| task.priority()),
                completed_at: entry.recorded_at(),
            });
        }
        Ok(completed)
    }

    /// Returns the history entries for one task, newest first, scoped to
    /// the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Ledger`] when the lookup fails.
    pub async fn history_for_task(
        &self,
        task_id: TaskId,
        owner_id: UserId,
    ) -> TaskLifecycleResult<Vec<HistoryEntry>> {
        let mut entries = self.ledger.find_by_task(task_id, true).await?;
        entries.retain(|entry| entry.user_id() == owner_id);
        Ok(entries)
    }

    /// Returns every history entry recorded for the user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Ledger`] when the lookup fails.
    pub async fn history_for_owner(
        &self,
        owner_id: UserId,
    ) -> TaskLifecycleResult<Vec<HistoryEntry>> {
        Ok(self.ledger.find_by_owner(owner_id).await?)
    }

    /// Returns the owner's dashboard counters for the clock's current day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] or
    /// [`TaskLifecycleError::Ledger`] when a lookup fails.
    pub async fn statistics(&self, owner_id: UserId) -> TaskLifecycleResult<TaskStats> {
        let today = self.clock.utc().date_naive();
        let active = self.repository.count_active(owner_id).await?;
        let due_today = self.repository.count_due_on(owner_id, today).await?;
        let high_priority = self.repository.count_high_priority(owner_id).await?;
        let completions = self.ledger.completions_by_owner(owner_id).await?;
        let completed_today = completions
            .iter()
            .filter(|entry| entry.recorded_at().date_naive() == today)
            .count();

        Ok(TaskStats {
            active,
            due_today,
            high_priority,
            completed_today: u64::try_from(completed_today).unwrap_or_default(),
        })
    }

    async fn load_owned(&self, task_id: TaskId, owner_id: UserId) -> TaskLifecycleResult<Task> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))?;
        if task.owner() != owner_id {
            return Err(TaskLifecycleError::NotFound(task_id));
        }
        Ok(task)
    }

    async fn resolve_category(&self, owner_id: UserId, raw: &str) -> Option<CategoryRef> {
        let Some(category_id) = CategoryId::parse(raw) else {
            warn!(input = raw, "ignoring unparseable category identifier");
            return None;
        };
        match self.categories.find_for_owner(category_id, owner_id).await {
            Ok(category) => category,
            Err(err) => {
                warn!(
                    category_id = %category_id,
                    error = %err,
                    "category lookup failed; leaving category unset"
                );
                None
            }
        }
    }
}

/// Maps an empty-after-trim string to `None`.
fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
