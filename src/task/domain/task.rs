//! Task aggregate root.

use super::{CategoryRef, Priority, TaskDomainError, TaskId, TaskStatus, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Task aggregate root.
///
/// A task is owned exclusively by its creating user and is mutated only
/// through the lifecycle orchestrator, which keeps the history ledger
/// consistent with every observable transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: UserId,
    category: Option<CategoryRef>,
    title: String,
    description: Option<String>,
    start_date: NaiveDate,
    due_date: Option<NaiveDate>,
    priority: Priority,
    status: TaskStatus,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner identifier.
    pub owner: UserId,
    /// Persisted category reference, if any.
    pub category: Option<CategoryRef>,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted start date.
    pub start_date: NaiveDate,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task owned by the given user.
    ///
    /// The start date defaults to the clock's current day and the creation
    /// timestamp is fixed at construction.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn new(
        owner: UserId,
        title: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            owner,
            category: None,
            title: trimmed.to_owned(),
            description: None,
            start_date: timestamp.date_naive(),
            due_date: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
            created_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            category: data.category,
            title: data.title,
            description: data.description,
            start_date: data.start_date,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user's identifier.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the category reference, if any.
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the start date.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the new title is empty
    /// after trimming.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), TaskDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        self.title = trimmed.to_owned();
        Ok(())
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replaces the start date.
    pub const fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
    }

    /// Replaces the due date.
    pub const fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date;
    }

    /// Replaces the priority.
    pub const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Replaces the lifecycle status.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Replaces the category reference.
    pub fn set_category(&mut self, category: Option<CategoryRef>) {
        self.category = category;
    }

    /// Returns `true` when the task has a due date strictly before `today`
    /// and is still active.
    ///
    /// A task due today is not overdue; only strictly-past due dates
    /// qualify for the sweep.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_active() && self.due_date.is_some_and(|due| due < today)
    }
}

/// Parses the date portion of an ISO-8601-like input string.
///
/// Only the leading ten characters are significant, so both `2026-08-05`
/// and `2026-08-05T14:30:00Z` parse to the same date. A malformed value is
/// logged and dropped rather than surfaced to the caller; the due date
/// simply stays unset.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let Some(date_part) = raw.get(0..10) else {
        warn!(input = raw, "discarding due date shorter than a full date");
        return None;
    };
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!(input = raw, error = %err, "discarding unparseable due date");
            None
        }
    }
}
