//! In-memory task repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CategoryId, Priority, Task, TaskId, TaskStatus, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockReadGuard<'_, HashMap<TaskId, Task>>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_lock(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockWriteGuard<'_, HashMap<TaskId, Task>>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn filter_owned<F>(&self, owner: UserId, predicate: F) -> TaskRepositoryResult<Vec<Task>>
    where
        F: Fn(&Task) -> bool,
    {
        let state = self.read_lock()?;
        Ok(state
            .values()
            .filter(|task| task.owner() == owner && predicate(task))
            .cloned()
            .collect())
    }
}

/// Sorts tasks by due date ascending, tasks without a due date last.
fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.due_date().is_none(), task.due_date()));
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_lock()?;
        if state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_lock()?;
        if !state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write_lock()?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_lock()?;
        Ok(state.get(&id).cloned())
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_lock()?;
        Ok(state.values().cloned().collect())
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.filter_owned(owner, |_| true)
    }

    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.filter_owned(owner, |task| task.status() == status)
    }

    async fn find_by_owner_excluding_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.filter_owned(owner, |task| task.status() != status)
    }

    async fn find_by_category(&self, category: CategoryId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_lock()?;
        Ok(state
            .values()
            .filter(|task| task.category().is_some_and(|cat| cat.id() == category))
            .cloned()
            .collect())
    }

    async fn find_by_priority(
        &self,
        owner: UserId,
        priority: Priority,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.filter_owned(owner, |task| task.priority() == priority)
    }

    async fn find_due_between(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks = self.filter_owned(owner, |task| {
            task.status().is_active()
                && task.due_date().is_some_and(|due| due >= from && due <= to)
        })?;
        sort_by_due_date(&mut tasks);
        Ok(tasks)
    }

    async fn find_incomplete(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks = self.filter_owned(owner, |task| task.status() == TaskStatus::Incomplete)?;
        sort_by_due_date(&mut tasks);
        Ok(tasks)
    }

    async fn count_active(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        let tasks = self.filter_owned(owner, |task| task.status().is_active())?;
        Ok(u64::try_from(tasks.len()).unwrap_or(u64::MAX))
    }

    async fn count_due_on(&self, owner: UserId, date: NaiveDate) -> TaskRepositoryResult<u64> {
        let tasks = self.filter_owned(owner, |task| {
            task.status() != TaskStatus::Completed && task.due_date() == Some(date)
        })?;
        Ok(u64::try_from(tasks.len()).unwrap_or(u64::MAX))
    }

    async fn count_high_priority(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        let tasks = self.filter_owned(owner, |task| {
            task.status() != TaskStatus::Completed && task.priority() == Priority::High
        })?;
        Ok(u64::try_from(tasks.len()).unwrap_or(u64::MAX))
    }
}
