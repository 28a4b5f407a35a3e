//! In-memory user and category directories.
//!
//! These adapters stand in for the identity and category subsystems that
//! live outside the core. Tests seed them directly; a deployment would
//! wire the real collaborators behind the same ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CategoryId, CategoryRef, UserId, UserRef},
    ports::{CategoryDirectory, DirectoryError, DirectoryResult, UserDirectory},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<HashMap<UserId, UserRef>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user, replacing any previous entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the directory lock is
    /// poisoned.
    pub fn insert(&self, user: UserRef) -> DirectoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        state.insert(user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> DirectoryResult<Option<UserRef>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(state.get(&id).cloned())
    }

    async fn list_all(&self) -> DirectoryResult<Vec<UserRef>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(state.values().cloned().collect())
    }
}

/// Thread-safe in-memory category directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryDirectory {
    state: Arc<RwLock<HashMap<CategoryId, (UserId, CategoryRef)>>>,
}

impl InMemoryCategoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the directory lock is
    /// poisoned.
    pub fn insert(&self, owner: UserId, category: CategoryRef) -> DirectoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        state.insert(category.id(), (owner, category));
        Ok(())
    }
}

#[async_trait]
impl CategoryDirectory for InMemoryCategoryDirectory {
    async fn find_for_owner(
        &self,
        id: CategoryId,
        owner: UserId,
    ) -> DirectoryResult<Option<CategoryRef>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(state
            .get(&id)
            .filter(|(category_owner, _)| *category_owner == owner)
            .map(|(_, category)| category.clone()))
    }
}
