//! Port for the append-only history ledger.

use crate::task::domain::{HistoryEntry, HistoryEntryId, TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for history ledger operations.
pub type HistoryLedgerResult<T> = Result<T, HistoryLedgerError>;

/// History persistence contract.
///
/// Entries are write-once. The only deletions the ledger performs are the
/// purge of completion entries when a task is restored and the discard of
/// a just-written entry while rolling back a failed store write; entries
/// are never updated in place.
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    /// Appends an entry to the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryLedgerError::DuplicateEntry`] when the entry ID
    /// already exists.
    async fn append(&self, entry: &HistoryEntry) -> HistoryLedgerResult<()>;

    /// Removes a single entry. Used only for restore cleanup and for
    /// rolling back the ledger half of a failed atomic operation.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryLedgerError::NotFound`] when the entry does not
    /// exist.
    async fn remove(&self, id: HistoryEntryId) -> HistoryLedgerResult<()>;

    /// Deletes every completion entry for the given task, returning the
    /// number removed. Restoring a task to pending invalidates its
    /// "was completed" history.
    async fn purge_completions(&self, task_id: TaskId) -> HistoryLedgerResult<usize>;

    /// Returns the entries for a task, optionally ordered newest-first.
    async fn find_by_task(
        &self,
        task_id: TaskId,
        newest_first: bool,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>>;

    /// Returns every entry recorded for the given owner.
    async fn find_by_owner(&self, owner: UserId) -> HistoryLedgerResult<Vec<HistoryEntry>>;

    /// Returns the owner's completion entries, newest first. Backs the
    /// completed-tasks view.
    async fn completions_by_owner(&self, owner: UserId)
    -> HistoryLedgerResult<Vec<HistoryEntry>>;

    /// Returns the completion entries for a single task.
    async fn completions_for_task(
        &self,
        task_id: TaskId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>>;
}

/// Errors returned by history ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum HistoryLedgerError {
    /// An entry with the same identifier already exists.
    #[error("duplicate history entry: {0}")]
    DuplicateEntry(HistoryEntryId),

    /// The entry was not found.
    #[error("history entry not found: {0}")]
    NotFound(HistoryEntryId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl HistoryLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
