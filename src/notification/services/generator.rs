//! Notification generation and dismissal.
//!
//! Two generation shapes exist on purpose: the on-demand path emits one
//! notification per qualifying task for a single user, while the scheduled
//! path sweeps every user and emits one aggregate notification per alert
//! category. Neither path deduplicates against earlier runs; repeated
//! generation accumulates repeated alerts.

use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind},
    ports::{NotificationRepository, NotificationRepositoryError},
};
use crate::task::{
    domain::{Task, UserId},
    ports::{DirectoryError, TaskRepository, TaskRepositoryError, UserDirectory},
};
use chrono::{Days, NaiveDate};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Width of the upcoming-due window in days. The window is inclusive on
/// both ends: a task due exactly three days from today still qualifies.
const UPCOMING_WINDOW_DAYS: u64 = 3;

/// Service-level errors for notification operations.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// The notification does not exist or belongs to another user.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// The acting user is not registered.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// Notification store operation failed.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),

    /// Task store lookup failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for notification service operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Notification lookup, dismissal, and generation service.
#[derive(Clone)]
pub struct NotificationService<N, R, U, K>
where
    N: NotificationRepository,
    R: TaskRepository,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    notifications: Arc<N>,
    tasks: Arc<R>,
    users: Arc<U>,
    clock: Arc<K>,
}

impl<N, R, U, K> NotificationService<N, R, U, K>
where
    N: NotificationRepository,
    R: TaskRepository,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    /// Creates a new notification service.
    #[must_use]
    pub const fn new(
        notifications: Arc<N>,
        tasks: Arc<R>,
        users: Arc<U>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            notifications,
            tasks,
            users,
            clock,
        }
    }

    /// Returns the owner's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the lookup
    /// fails.
    pub async fn list_for_user(
        &self,
        owner: UserId,
    ) -> NotificationServiceResult<Vec<Notification>> {
        Ok(self.notifications.find_by_owner(owner).await?)
    }

    /// Returns the owner's unread notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the lookup
    /// fails.
    pub async fn unread_for_user(
        &self,
        owner: UserId,
    ) -> NotificationServiceResult<Vec<Notification>> {
        Ok(self.notifications.find_unread(owner).await?)
    }

    /// Counts the owner's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the lookup
    /// fails.
    pub async fn unread_count(&self, owner: UserId) -> NotificationServiceResult<u64> {
        Ok(self.notifications.count_unread(owner).await?)
    }

    /// Marks one of the owner's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] when the
    /// notification is missing or owned by another user.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        owner: UserId,
    ) -> NotificationServiceResult<()> {
        self.load_owned(id, owner).await?;
        Ok(self.notifications.mark_read(id).await?)
    }

    /// Marks all of the owner's notifications read, returning the number
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the update
    /// fails.
    pub async fn mark_all_read(&self, owner: UserId) -> NotificationServiceResult<usize> {
        Ok(self.notifications.mark_all_read(owner).await?)
    }

    /// Deletes one of the owner's notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] when the
    /// notification is missing or owned by another user.
    pub async fn delete(&self, id: NotificationId, owner: UserId) -> NotificationServiceResult<()> {
        self.load_owned(id, owner).await?;
        Ok(self.notifications.delete(id).await?)
    }

    /// Deletes the owner's already-read notifications, returning the
    /// number removed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the delete
    /// fails.
    pub async fn clear_read(&self, owner: UserId) -> NotificationServiceResult<usize> {
        Ok(self.notifications.delete_read(owner).await?)
    }

    /// Generates per-task notifications for one user on demand.
    ///
    /// Emits one upcoming-due alert for each active task due within the
    /// next three days (inclusive) and one overdue alert for each
    /// incomplete task. No deduplication is performed; repeated calls
    /// accumulate duplicates. Returns the number of notifications created.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::UnknownUser`] when the user is
    /// not registered, or a repository error when persistence fails.
    pub async fn generate_for_user(&self, owner: UserId) -> NotificationServiceResult<usize> {
        let user = self
            .users
            .find_by_id(owner)
            .await?
            .ok_or(NotificationServiceError::UnknownUser(owner))?;

        let today = self.clock.utc().date_naive();
        let horizon = upcoming_horizon(today);
        let mut created = 0;

        let upcoming = self.tasks.find_due_between(user.id(), today, horizon).await?;
        for task in upcoming {
            let message = upcoming_message(&task);
            let notification = Notification::for_task(
                user.id(),
                task.id(),
                NotificationKind::UpcomingDue,
                message,
                &*self.clock,
            );
            self.notifications.store(&notification).await?;
            created += 1;
        }

        let overdue = self.tasks.find_incomplete(user.id()).await?;
        for task in overdue {
            let message = overdue_message(&task);
            let notification = Notification::for_task(
                user.id(),
                task.id(),
                NotificationKind::Overdue,
                message,
                &*self.clock,
            );
            self.notifications.store(&notification).await?;
            created += 1;
        }

        Ok(created)
    }

    /// Generates aggregate notifications for every registered user.
    ///
    /// Emits at most one upcoming-due and one overdue notification per
    /// user per run, each summarising the count of qualifying tasks. A
    /// failure for one user is logged and the sweep continues. Returns the
    /// number of notifications created.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Directory`] when the user list
    /// itself cannot be fetched.
    pub async fn generate_automatic(&self) -> NotificationServiceResult<usize> {
        let today = self.clock.utc().date_naive();
        let horizon = upcoming_horizon(today);
        let users = self.users.list_all().await?;
        let mut created = 0;

        for user in users {
            match self.generate_aggregates(user.id(), today, horizon).await {
                Ok(count) => created += count,
                Err(err) => {
                    warn!(
                        user_id = %user.id(),
                        error = %err,
                        "skipping user in automatic notification sweep"
                    );
                }
            }
        }

        info!(created, "automatic notification sweep finished");
        Ok(created)
    }

    async fn generate_aggregates(
        &self,
        owner: UserId,
        today: NaiveDate,
        horizon: NaiveDate,
    ) -> NotificationServiceResult<usize> {
        let mut created = 0;

        let upcoming = self.tasks.find_due_between(owner, today, horizon).await?;
        if !upcoming.is_empty() {
            let message = format!(
                "You have {} task(s) due in the next {UPCOMING_WINDOW_DAYS} days",
                upcoming.len()
            );
            let notification =
                Notification::new(owner, NotificationKind::UpcomingDue, message, &*self.clock);
            self.notifications.store(&notification).await?;
            created += 1;
        }

        let overdue = self.tasks.find_incomplete(owner).await?;
        if !overdue.is_empty() {
            let message = format!("You have {} overdue task(s)", overdue.len());
            let notification =
                Notification::new(owner, NotificationKind::Overdue, message, &*self.clock);
            self.notifications.store(&notification).await?;
            created += 1;
        }

        Ok(created)
    }

    async fn load_owned(
        &self,
        id: NotificationId,
        owner: UserId,
    ) -> NotificationServiceResult<Notification> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or(NotificationServiceError::NotFound(id))?;
        if notification.owner() != owner {
            return Err(NotificationServiceError::NotFound(id));
        }
        Ok(notification)
    }
}

/// Last day of the inclusive upcoming-due window.
fn upcoming_horizon(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(today)
}

fn upcoming_message(task: &Task) -> String {
    task.due_date().map_or_else(
        || format!("Task '{}' is due soon", task.title()),
        |due| format!("Task '{}' is due on {due}", task.title()),
    )
}

fn overdue_message(task: &Task) -> String {
    task.due_date().map_or_else(
        || format!("Task '{}' is overdue", task.title()),
        |due| format!("Task '{}' has been overdue since {due}", task.title()),
    )
}
