//! Lookup ports for entities owned by excluded collaborators.
//!
//! Identity and category management live outside this core; the lifecycle
//! orchestrator and the scheduled notification generator only need the
//! read-side contracts below.

use crate::task::domain::{CategoryId, CategoryRef, UserId, UserRef};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read access to the user accounts of the surrounding application.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves a user by identifier. Returns `None` when unknown.
    async fn find_by_id(&self, id: UserId) -> DirectoryResult<Option<UserRef>>;

    /// Returns every registered user. Used by the scheduled notification
    /// generator, which sweeps all accounts.
    async fn list_all(&self) -> DirectoryResult<Vec<UserRef>>;
}

/// Read access to task categories, scoped to their owning user.
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    /// Resolves a category by identifier for the given owner.
    ///
    /// Returns `None` when the category does not exist or belongs to a
    /// different user.
    async fn find_for_owner(
        &self,
        id: CategoryId,
        owner: UserId,
    ) -> DirectoryResult<Option<CategoryRef>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Lookup-layer failure.
    #[error("directory error: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a lookup error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
