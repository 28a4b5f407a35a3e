//! In-memory notification repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::domain::UserId;

/// Thread-safe in-memory notification repository.
///
/// Notifications are held in insertion order; "newest first" is served by
/// reversing, so entries created under a fixed test clock keep a stable
/// order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    state: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(
        &self,
    ) -> NotificationRepositoryResult<std::sync::RwLockReadGuard<'_, Vec<Notification>>> {
        self.state.read().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_lock(
        &self,
    ) -> NotificationRepositoryResult<std::sync::RwLockWriteGuard<'_, Vec<Notification>>> {
        self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn store(&self, notification: &Notification) -> NotificationRepositoryResult<()> {
        let mut state = self.write_lock()?;
        if state.iter().any(|existing| existing.id() == notification.id()) {
            return Err(NotificationRepositoryError::DuplicateNotification(
                notification.id(),
            ));
        }
        state.push(notification.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        let state = self.read_lock()?;
        Ok(state.iter().find(|n| n.id() == id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let state = self.read_lock()?;
        let mut notifications: Vec<Notification> = state
            .iter()
            .filter(|n| n.owner() == owner)
            .cloned()
            .collect();
        notifications.reverse();
        Ok(notifications)
    }

    async fn find_unread(&self, owner: UserId) -> NotificationRepositoryResult<Vec<Notification>> {
        let state = self.read_lock()?;
        let mut notifications: Vec<Notification> = state
            .iter()
            .filter(|n| n.owner() == owner && !n.is_read())
            .cloned()
            .collect();
        notifications.reverse();
        Ok(notifications)
    }

    async fn count_unread(&self, owner: UserId) -> NotificationRepositoryResult<u64> {
        let state = self.read_lock()?;
        let count = state
            .iter()
            .filter(|n| n.owner() == owner && !n.is_read())
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let mut state = self.write_lock()?;
        let notification = state
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;
        notification.mark_read();
        Ok(())
    }

    async fn mark_all_read(&self, owner: UserId) -> NotificationRepositoryResult<usize> {
        let mut state = self.write_lock()?;
        let mut changed = 0;
        for notification in state
            .iter_mut()
            .filter(|n| n.owner() == owner && !n.is_read())
        {
            notification.mark_read();
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let mut state = self.write_lock()?;
        let before = state.len();
        state.retain(|n| n.id() != id);
        if state.len() == before {
            return Err(NotificationRepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_read(&self, owner: UserId) -> NotificationRepositoryResult<usize> {
        let mut state = self.write_lock()?;
        let before = state.len();
        state.retain(|n| !(n.owner() == owner && n.is_read()));
        Ok(before - state.len())
    }
}
