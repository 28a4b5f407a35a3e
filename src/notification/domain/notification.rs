//! Notification entity and alert kinds.

use super::{NotificationId, ProjectId};
use crate::task::domain::{TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The alert category a notification belongs to.
///
/// The set is open-ended; new kinds are added as the surrounding
/// application grows new alert sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task is due within the upcoming-due window.
    UpcomingDue,
    /// A task is past its due date.
    Overdue,
    /// A project the user participates in changed.
    ProjectUpdated,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpcomingDue => "upcoming_due",
            Self::Overdue => "overdue",
            Self::ProjectUpdated => "project_updated",
        }
    }

    /// Returns the wire representation (upper-case).
    #[must_use]
    pub const fn wire_str(self) -> &'static str {
        match self {
            Self::UpcomingDue => "UPCOMING_DUE",
            Self::Overdue => "OVERDUE",
            Self::ProjectUpdated => "PROJECT_UPDATED",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upcoming_due" => Ok(Self::UpcomingDue),
            "overdue" => Ok(Self::Overdue),
            "project_updated" => Ok(Self::ProjectUpdated),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// A dismissible alert owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    owner: UserId,
    task_id: Option<TaskId>,
    project_id: Option<ProjectId>,
    kind: NotificationKind,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted notification identifier.
    pub id: NotificationId,
    /// Persisted owner identifier.
    pub owner: UserId,
    /// Persisted task reference, if any.
    pub task_id: Option<TaskId>,
    /// Persisted project reference, if any.
    pub project_id: Option<ProjectId>,
    /// Persisted alert kind.
    pub kind: NotificationKind,
    /// Persisted message text.
    pub message: String,
    /// Persisted read flag.
    pub read: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification without an entity reference.
    #[must_use]
    pub fn new(
        owner: UserId,
        kind: NotificationKind,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            owner,
            task_id: None,
            project_id: None,
            kind,
            message: message.into(),
            read: false,
            created_at: clock.utc(),
        }
    }

    /// Creates an unread notification referencing a task.
    #[must_use]
    pub fn for_task(
        owner: UserId,
        task_id: TaskId,
        kind: NotificationKind,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            owner,
            task_id: Some(task_id),
            project_id: None,
            kind,
            message: message.into(),
            read: false,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            task_id: data.task_id,
            project_id: data.project_id,
            kind: data.kind,
            message: data.message,
            read: data.read,
            created_at: data.created_at,
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the owning user's identifier.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the referenced task, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the referenced project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the alert kind.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` once the owner has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Flips the read flag. The only mutation a notification permits.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }
}
