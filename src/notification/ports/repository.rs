//! Repository port for notification persistence.

use crate::notification::domain::{Notification, NotificationId};
use crate::task::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Notification persistence contract.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a new notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::DuplicateNotification`] when
    /// the identifier already exists.
    async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()>;

    /// Finds a notification by identifier. Returns `None` when absent.
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>>;

    /// Returns the owner's notifications, newest first.
    async fn find_by_owner(&self, owner: UserId)
    -> NotificationRepositoryResult<Vec<Notification>>;

    /// Returns the owner's unread notifications, newest first.
    async fn find_unread(&self, owner: UserId) -> NotificationRepositoryResult<Vec<Notification>>;

    /// Counts the owner's unread notifications.
    async fn count_unread(&self, owner: UserId) -> NotificationRepositoryResult<u64>;

    /// Marks one notification read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when the
    /// identifier is unknown.
    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()>;

    /// Marks every unread notification of the owner read, returning the
    /// number changed.
    async fn mark_all_read(&self, owner: UserId) -> NotificationRepositoryResult<usize>;

    /// Deletes one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when the
    /// identifier is unknown.
    async fn delete(&self, id: NotificationId) -> NotificationRepositoryResult<()>;

    /// Deletes every already-read notification of the owner, returning the
    /// number removed.
    async fn delete_read(&self, owner: UserId) -> NotificationRepositoryResult<usize>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// A notification with the same identifier already exists.
    #[error("duplicate notification identifier: {0}")]
    DuplicateNotification(NotificationId),

    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
