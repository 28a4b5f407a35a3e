//! References to entities owned by excluded collaborators.
//!
//! Users and categories are managed outside this core; the task engine only
//! sees resolved references handed back by the directory ports.

use super::{CategoryId, UserId};
use serde::{Deserialize, Serialize};

/// Resolved reference to an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    id: UserId,
    display_name: String,
}

impl UserRef {
    /// Creates a user reference from identity data.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Resolved reference to a task category, carried on the task so that
/// list views render without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    id: CategoryId,
    name: String,
    color: String,
}

impl CategoryRef {
    /// Creates a category reference from directory data.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Returns the category identifier.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.id
    }

    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}
