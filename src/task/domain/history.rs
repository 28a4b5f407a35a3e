//! History ledger entries and the completion snapshot.
//!
//! Every observable task transition appends one immutable entry. Entries
//! recording a transition into [`TaskStatus::Completed`] additionally carry
//! a denormalized snapshot of the task, which is the sole mechanism by
//! which completed-task detail survives later edits or deletion of the
//! live record.

use super::{HistoryEntryId, Task, TaskId, TaskStatus, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle event an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// The task was edited without a status change.
    Updated,
    /// The task status changed.
    StatusChanged {
        /// Status before the transition.
        from: TaskStatus,
        /// Status after the transition.
        to: TaskStatus,
    },
    /// The task was deleted from the store.
    Deleted,
    /// The task was restored to pending from the completed view.
    Restored,
}

impl HistoryAction {
    /// Returns `true` for actions recording a transition into
    /// [`TaskStatus::Completed`] from a non-completed status.
    #[must_use]
    pub const fn is_completion(self) -> bool {
        match self {
            Self::StatusChanged {
                from,
                to: TaskStatus::Completed,
            } => !matches!(from, TaskStatus::Completed),
            _ => false,
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::StatusChanged { from, to } => {
                write!(f, "status changed from {from} to {to}")
            }
            Self::Deleted => write!(f, "deleted"),
            Self::Restored => write!(f, "restored"),
        }
    }
}

/// Denormalized copy of a task's fields at the moment of completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Title at completion time.
    pub title: String,
    /// Description at completion time.
    pub description: Option<String>,
    /// Category name at completion time, if a category was set.
    pub category_name: Option<String>,
    /// Due date at completion time.
    pub due_date: Option<NaiveDate>,
    /// Start date at completion time.
    pub start_date: NaiveDate,
}

impl TaskSnapshot {
    /// Captures the snapshot fields from a live task.
    #[must_use]
    pub fn capture(task: &Task) -> Self {
        Self {
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            category_name: task.category().map(|category| category.name().to_owned()),
            due_date: task.due_date(),
            start_date: task.start_date(),
        }
    }
}

/// One immutable record in the history ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    id: HistoryEntryId,
    task_id: TaskId,
    user_id: UserId,
    action: HistoryAction,
    recorded_at: DateTime<Utc>,
    snapshot: Option<TaskSnapshot>,
}

/// Parameter object for reconstructing a persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Persisted entry identifier.
    pub id: HistoryEntryId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted actor reference.
    pub user_id: UserId,
    /// Persisted action.
    pub action: HistoryAction,
    /// Persisted timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Persisted completion snapshot, if any.
    pub snapshot: Option<TaskSnapshot>,
}

impl HistoryEntry {
    fn record(task: &Task, actor: UserId, action: HistoryAction, clock: &impl Clock) -> Self {
        let snapshot = action.is_completion().then(|| TaskSnapshot::capture(task));
        Self {
            id: HistoryEntryId::new(),
            task_id: task.id(),
            user_id: actor,
            action,
            recorded_at: clock.utc(),
            snapshot,
        }
    }

    /// Records the creation of a task. No snapshot fields are written.
    #[must_use]
    pub fn created(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task, actor, HistoryAction::Created, clock)
    }

    /// Records an edit that did not change the task's status.
    #[must_use]
    pub fn updated(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task, actor, HistoryAction::Updated, clock)
    }

    /// Records a status transition.
    ///
    /// When the transition enters [`TaskStatus::Completed`] from any other
    /// status, the entry captures the task's completion snapshot.
    #[must_use]
    pub fn status_changed(
        task: &Task,
        actor: UserId,
        from: TaskStatus,
        to: TaskStatus,
        clock: &impl Clock,
    ) -> Self {
        Self::record(task, actor, HistoryAction::StatusChanged { from, to }, clock)
    }

    /// Records the deletion of a task. Written before the store removes
    /// the record, so the entry is the only remaining trace afterwards.
    #[must_use]
    pub fn deleted(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task, actor, HistoryAction::Deleted, clock)
    }

    /// Records the restoration of a completed task back to pending.
    #[must_use]
    pub fn restored(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task, actor, HistoryAction::Restored, clock)
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            user_id: data.user_id,
            action: data.action,
            recorded_at: data.recorded_at,
            snapshot: data.snapshot,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryEntryId {
        self.id
    }

    /// Returns the recorded task's identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.action
    }

    /// Returns the human-readable action label.
    #[must_use]
    pub fn action_label(&self) -> String {
        self.action.to_string()
    }

    /// Returns the entry timestamp.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Returns the completion snapshot, if this entry carries one.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&TaskSnapshot> {
        self.snapshot.as_ref()
    }

    /// Returns `true` when this entry records a completion and therefore
    /// backs the completed-tasks view.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        self.action.is_completion()
    }
}
