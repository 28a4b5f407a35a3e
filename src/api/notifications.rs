//! Notification endpoint operations.

use super::{
    ApiError,
    dto::{NotificationResponse, StatusResponse, SuccessResponse, UnreadCountResponse},
};
use crate::notification::{
    domain::NotificationId,
    ports::NotificationRepository,
    services::NotificationService,
};
use crate::task::{
    domain::UserId,
    ports::{TaskRepository, UserDirectory},
};
use mockable::Clock;

/// JSON facade for the notification endpoints.
#[derive(Clone)]
pub struct NotificationApi<N, R, U, K>
where
    N: NotificationRepository,
    R: TaskRepository,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    service: NotificationService<N, R, U, K>,
}

impl<N, R, U, K> NotificationApi<N, R, U, K>
where
    N: NotificationRepository,
    R: TaskRepository,
    U: UserDirectory,
    K: Clock + Send + Sync,
{
    /// Creates the facade over a notification service.
    #[must_use]
    pub const fn new(service: NotificationService<N, R, U, K>) -> Self {
        Self { service }
    }

    /// `GET` notifications: the current user's alerts, newest first.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<NotificationResponse>, ApiError> {
        let notifications = self.service.list_for_user(owner).await?;
        Ok(notifications
            .iter()
            .map(NotificationResponse::from_notification)
            .collect())
    }

    /// `GET` notifications/count: unread counter.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the lookup fails.
    pub async fn unread_count(&self, owner: UserId) -> Result<UnreadCountResponse, ApiError> {
        let count = self.service.unread_count(owner).await?;
        Ok(UnreadCountResponse { count })
    }

    /// `POST` notifications/{id}/mark-read.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError`] for an unknown or foreign notification,
    /// a 500 otherwise.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        owner: UserId,
    ) -> Result<SuccessResponse, ApiError> {
        self.service.mark_read(id, owner).await?;
        Ok(SuccessResponse { success: true })
    }

    /// `POST` notifications/mark-all-read.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the update fails.
    pub async fn mark_all_read(&self, owner: UserId) -> Result<SuccessResponse, ApiError> {
        self.service.mark_all_read(owner).await?;
        Ok(SuccessResponse { success: true })
    }

    /// `DELETE` notifications/{id}.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError`] for an unknown or foreign notification,
    /// a 500 otherwise.
    pub async fn delete(
        &self,
        id: NotificationId,
        owner: UserId,
    ) -> Result<SuccessResponse, ApiError> {
        self.service.delete(id, owner).await?;
        Ok(SuccessResponse { success: true })
    }

    /// `DELETE` notifications/clear-read: bulk-delete already-read alerts.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`ApiError`] when the delete fails.
    pub async fn clear_read(&self, owner: UserId) -> Result<StatusResponse, ApiError> {
        let removed = self.service.clear_read(owner).await?;
        Ok(StatusResponse {
            success: true,
            message: format!("Deleted {removed} read notification(s)"),
        })
    }

    /// `POST` notifications/generate: on-demand per-task generation for
    /// the current user.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`ApiError`] for an unknown user, a 500 otherwise.
    pub async fn generate(&self, owner: UserId) -> Result<StatusResponse, ApiError> {
        let created = self.service.generate_for_user(owner).await?;
        Ok(StatusResponse {
            success: true,
            message: format!("Generated {created} notification(s)"),
        })
    }
}
