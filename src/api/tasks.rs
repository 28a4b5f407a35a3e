//! Task endpoint operations.

use super::{
    ApiError,
    dto::{
        CompletedTaskResponse, HistoryEntryResponse, StatsResponse, StatusResponse,
        SuccessResponse, TaskPayload, TaskResponse,
    },
};
use crate::task::{
    domain::{TaskId, UserId},
    ports::{CategoryDirectory, HistoryLedger, TaskRepository, UserDirectory},
    services::{TaskChanges, TaskDraft, TaskLifecycleError, TaskLifecycleService},
};
use mockable::Clock;

/// JSON facade for the task endpoints.
#[derive(Clone)]
pub struct TaskApi<R, L, G, U, K>
where
    R: TaskRepository,
    L: HistoryLedger,
    G: CategoryDirectory,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    service: TaskLifecycleService<R, L, G, U, K>,
}

impl<R, L, G, U, K> TaskApi<R, L, G, U, K>
where
    R: TaskRepository,
    L: HistoryLedger,
    G: CategoryDirectory,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    /// Creates the facade over a lifecycle service.
    #[must_use]
    pub const fn new(service: TaskLifecycleService<R, L, G, U, K>) -> Self {
        Self { service }
    }

    /// `POST` create-task.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when persistence fails; malformed
    /// optional fields never reject the request.
    pub async fn save_task(
        &self,
        owner: UserId,
        payload: TaskPayload,
    ) -> Result<TaskResponse, ApiError> {
        let mut draft = TaskDraft::new(payload.title.unwrap_or_default());
        if let Some(description) = payload.description {
            draft = draft.with_description(description);
        }
        if let Some(due_date) = payload.due_date {
            draft = draft.with_due_date(due_date);
        }
        if let Some(priority) = payload.priority {
            draft = draft.with_priority(priority);
        }
        if let Some(status) = payload.status {
            draft = draft.with_status(status);
        }
        if let Some(category_id) = payload.category_id {
            draft = draft.with_category(category_id);
        }

        let task = self.service.create_task(owner, draft).await?;
        Ok(TaskResponse::from_task(&task))
    }

    /// `PUT` update-task/{id}. Partial update; absent fields keep their
    /// prior value.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError`] for an unknown or foreign task, a 500
    /// otherwise.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        owner: UserId,
        payload: TaskPayload,
    ) -> Result<TaskResponse, ApiError> {
        let mut changes = TaskChanges::new();
        if let Some(title) = payload.title {
            changes = changes.with_title(title);
        }
        if let Some(description) = payload.description {
            changes = changes.with_description(description);
        }
        if let Some(due_date) = payload.due_date {
            changes = changes.with_due_date(due_date);
        }
        if let Some(priority) = payload.priority {
            changes = changes.with_priority(priority);
        }
        if let Some(status) = payload.status {
            changes = changes.with_status(status);
        }
        if let Some(category_id) = payload.category_id {
            changes = changes.with_category(category_id);
        }

        let task = self.service.update_task(task_id, owner, changes).await?;
        Ok(TaskResponse::from_task(&task))
    }

    /// `DELETE` task/{id}. An unknown or foreign task reports
    /// `{success: false}` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when persistence fails.
    pub async fn delete_task(
        &self,
        task_id: TaskId,
        owner: UserId,
    ) -> Result<SuccessResponse, ApiError> {
        match self.service.delete_task(task_id, owner).await {
            Ok(()) => Ok(SuccessResponse { success: true }),
            Err(TaskLifecycleError::NotFound(_)) => Ok(SuccessResponse { success: false }),
            Err(err) => Err(err.into()),
        }
    }

    /// `POST` restore-task/{id}.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError`] for an unknown or foreign task, a 500
    /// otherwise.
    pub async fn restore_task(
        &self,
        task_id: TaskId,
        owner: UserId,
    ) -> Result<StatusResponse, ApiError> {
        self.service.restore_task(task_id, owner).await?;
        Ok(StatusResponse {
            success: true,
            message: "Task restored to the dashboard".to_owned(),
        })
    }

    /// `GET` tasks: every task of the current user.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn tasks(&self, owner: UserId) -> Result<Vec<TaskResponse>, ApiError> {
        let tasks = self.service.tasks_for(owner).await?;
        Ok(tasks.iter().map(TaskResponse::from_task).collect())
    }

    /// `GET` tasks/active: tasks that are not completed.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn active_tasks(&self, owner: UserId) -> Result<Vec<TaskResponse>, ApiError> {
        let tasks = self.service.active_tasks(owner).await?;
        Ok(tasks.iter().map(TaskResponse::from_task).collect())
    }

    /// `GET` tasks/completed: served from the ledger's completion
    /// snapshots, so a later-edited task still shows its historical data.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn completed_tasks(
        &self,
        owner: UserId,
    ) -> Result<Vec<CompletedTaskResponse>, ApiError> {
        let completed = self.service.completed_tasks(owner).await?;
        Ok(completed
            .iter()
            .map(CompletedTaskResponse::from_completed)
            .collect())
    }

    /// `GET` history for one task, newest first.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn task_history(
        &self,
        task_id: TaskId,
        owner: UserId,
    ) -> Result<Vec<HistoryEntryResponse>, ApiError> {
        let entries = self.service.history_for_task(task_id, owner).await?;
        Ok(entries.iter().map(HistoryEntryResponse::from_entry).collect())
    }

    /// `GET` history for the current user.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn history(&self, owner: UserId) -> Result<Vec<HistoryEntryResponse>, ApiError> {
        let entries = self.service.history_for_owner(owner).await?;
        Ok(entries.iter().map(HistoryEntryResponse::from_entry).collect())
    }

    /// `GET` dashboard statistics for the current user.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when a lookup fails.
    pub async fn statistics(&self, owner: UserId) -> Result<StatsResponse, ApiError> {
        let stats = self.service.statistics(owner).await?;
        Ok(StatsResponse::from_stats(stats))
    }
}
