//! Repository port for task persistence and lookup.

use crate::task::domain::{CategoryId, Priority, Task, TaskId, TaskStatus, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each call is bounded by a single storage round-trip or transaction;
/// concurrent edits to the same task resolve last-write-wins.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists the complete desired state of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Removes a task unconditionally.
    ///
    /// Deletion does not cascade to history entries; the ledger is the
    /// durable record of deleted tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier. Returns `None` when absent.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task in the store. Used by the overdue sweep.
    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks owned by the given user.
    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's tasks in the given status.
    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's tasks excluding the given status.
    async fn find_by_owner_excluding_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks referencing the given category.
    async fn find_by_category(&self, category: CategoryId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's tasks at the given priority.
    async fn find_by_priority(
        &self,
        owner: UserId,
        priority: Priority,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's active tasks whose due date falls inside the
    /// inclusive `[from, to]` window, ordered by due date ascending.
    async fn find_due_between(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's incomplete (overdue-reclassified) tasks,
    /// ordered by due date ascending.
    async fn find_incomplete(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts the owner's active tasks.
    async fn count_active(&self, owner: UserId) -> TaskRepositoryResult<u64>;

    /// Counts the owner's not-completed tasks due exactly on `date`.
    async fn count_due_on(&self, owner: UserId, date: NaiveDate) -> TaskRepositoryResult<u64>;

    /// Counts the owner's not-completed high-priority tasks.
    async fn count_high_priority(&self, owner: UserId) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
