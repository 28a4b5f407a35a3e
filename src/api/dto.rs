//! Wire DTOs for the JSON endpoints.

use crate::notification::domain::{Notification, NotificationId};
use crate::task::domain::{
    CategoryId, CategoryRef, HistoryEntry, HistoryEntryId, Task, TaskId,
};
use crate::task::services::{CompletedTask, TaskStats};
use serde::{Deserialize, Serialize};

/// Incoming task fields for create and update requests.
///
/// All fields are free text; normalization happens in the orchestrator.
/// On update, absent fields keep their prior value, and an explicitly
/// empty `categoryId` clears the category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPayload {
    /// Task title.
    pub title: Option<String>,
    /// Task description.
    pub description: Option<String>,
    /// Due date, ISO date or date-time; the first ten characters are
    /// significant.
    pub due_date: Option<String>,
    /// Priority token, case- and format-insensitive.
    pub priority: Option<String>,
    /// Status token, case- and format-insensitive.
    pub status: Option<String>,
    /// Category identifier; empty string clears the category on update.
    pub category_id: Option<String>,
}

/// Category object embedded in task responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Display color.
    pub color: String,
}

impl CategoryResponse {
    fn from_ref(category: &CategoryRef) -> Self {
        Self {
            id: category.id(),
            name: category.name().to_owned(),
            color: category.color().to_owned(),
        }
    }
}

/// Task object served by the list and mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Task description, empty string when unset.
    pub description: String,
    /// ISO due date, empty string when unset.
    pub due_date: String,
    /// Upper-case priority token.
    pub priority: String,
    /// Upper-case status token, spaces not underscores.
    pub status: String,
    /// Embedded category, if any.
    pub category: Option<CategoryResponse>,
}

impl TaskResponse {
    /// Builds the response shape from a live task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().unwrap_or_default().to_owned(),
            due_date: task.due_date().map(|due| due.to_string()).unwrap_or_default(),
            priority: task.priority().wire_str().to_owned(),
            status: task.status().wire_str().to_owned(),
            category: task.category().map(CategoryResponse::from_ref),
        }
    }
}

/// Completed-task row served from ledger snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTaskResponse {
    /// Identifier of the completed task.
    pub id: TaskId,
    /// Identifier of the backing history entry.
    pub history_id: HistoryEntryId,
    /// Title at completion time.
    pub title: String,
    /// Description at completion time, empty string when unset.
    pub description: String,
    /// Category name at completion time.
    pub category: String,
    /// ISO due date at completion time, empty string when unset.
    pub due_date: String,
    /// Upper-case priority token.
    pub priority: String,
    /// Always `COMPLETED`.
    pub status: String,
}

impl CompletedTaskResponse {
    /// Builds the response shape from a completed-task view row.
    #[must_use]
    pub fn from_completed(completed: &CompletedTask) -> Self {
        Self {
            id: completed.task_id,
            history_id: completed.history_id,
            title: completed.title.clone(),
            description: completed.description.clone().unwrap_or_default(),
            category: completed
                .category_name
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_owned()),
            due_date: completed
                .due_date
                .map(|due| due.to_string())
                .unwrap_or_default(),
            priority: completed.priority.wire_str().to_owned(),
            status: "COMPLETED".to_owned(),
        }
    }
}

/// Completion snapshot embedded in history responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    /// Title at completion time.
    pub title: String,
    /// Description at completion time, empty string when unset.
    pub description: String,
    /// Category name at completion time, empty string when unset.
    pub category: String,
    /// ISO due date at completion time, empty string when unset.
    pub due_date: String,
    /// ISO start date at completion time.
    pub start_date: String,
}

/// History entry served by the history endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Recorded task identifier.
    pub task_id: TaskId,
    /// Human-readable action label.
    pub action: String,
    /// RFC 3339 timestamp of the entry.
    pub recorded_at: String,
    /// Completion snapshot, when the entry carries one.
    pub snapshot: Option<SnapshotResponse>,
}

impl HistoryEntryResponse {
    /// Builds the response shape from a ledger entry.
    #[must_use]
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id(),
            task_id: entry.task_id(),
            action: entry.action_label(),
            recorded_at: entry.recorded_at().to_rfc3339(),
            snapshot: entry.snapshot().map(|snapshot| SnapshotResponse {
                title: snapshot.title.clone(),
                description: snapshot.description.clone().unwrap_or_default(),
                category: snapshot.category_name.clone().unwrap_or_default(),
                due_date: snapshot
                    .due_date
                    .map(|due| due.to_string())
                    .unwrap_or_default(),
                start_date: snapshot.start_date.to_string(),
            }),
        }
    }
}

/// Notification object served by the notification endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// Notification identifier.
    pub id: NotificationId,
    /// Upper-case alert kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Message text.
    pub message: String,
    /// Read flag.
    pub read: bool,
    /// Referenced task, if any.
    pub task_id: Option<TaskId>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl NotificationResponse {
    /// Builds the response shape from a notification.
    #[must_use]
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id(),
            kind: notification.kind().wire_str().to_owned(),
            message: notification.message().to_owned(),
            read: notification.is_read(),
            task_id: notification.task_id(),
            created_at: notification.created_at().to_rfc3339(),
        }
    }
}

/// Minimal `{success}` response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    /// Whether the operation took effect.
    pub success: bool,
}

/// `{success, message}` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    /// Whether the operation took effect.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
}

/// Unread notification counter body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreadCountResponse {
    /// Number of unread notifications.
    pub count: u64,
}

/// Dashboard statistics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Tasks that are neither completed nor incomplete.
    pub active: u64,
    /// Not-completed tasks due today.
    pub due_today: u64,
    /// Not-completed high-priority tasks.
    pub high_priority: u64,
    /// Completions recorded today.
    pub completed_today: u64,
}

impl StatsResponse {
    /// Builds the response shape from service counters.
    #[must_use]
    pub const fn from_stats(stats: TaskStats) -> Self {
        Self {
            active: stats.active,
            due_today: stats.due_today,
            high_priority: stats.high_priority,
            completed_today: stats.completed_today,
        }
    }
}
