//! In-memory history ledger.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{HistoryEntry, HistoryEntryId, TaskId, UserId},
    ports::{HistoryLedger, HistoryLedgerError, HistoryLedgerResult},
};

/// Thread-safe in-memory history ledger.
///
/// Entries are held in insertion order so that "newest first" can be
/// served by reversing without comparing timestamps, which may collide
/// under a fixed test clock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryLedger {
    state: Arc<RwLock<InMemoryLedgerState>>,
}

#[derive(Debug, Default)]
struct InMemoryLedgerState {
    entries: Vec<HistoryEntry>,
    ids: HashSet<HistoryEntryId>,
}

impl InMemoryHistoryLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(
        &self,
    ) -> HistoryLedgerResult<std::sync::RwLockReadGuard<'_, InMemoryLedgerState>> {
        self.state.read().map_err(|err| {
            HistoryLedgerError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_lock(
        &self,
    ) -> HistoryLedgerResult<std::sync::RwLockWriteGuard<'_, InMemoryLedgerState>> {
        self.state.write().map_err(|err| {
            HistoryLedgerError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn collect<F>(&self, predicate: F) -> HistoryLedgerResult<Vec<HistoryEntry>>
    where
        F: Fn(&HistoryEntry) -> bool,
    {
        let state = self.read_lock()?;
        Ok(state
            .entries
            .iter()
            .filter(|entry| predicate(entry))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HistoryLedger for InMemoryHistoryLedger {
    async fn append(&self, entry: &HistoryEntry) -> HistoryLedgerResult<()> {
        let mut state = self.write_lock()?;
        if state.ids.contains(&entry.id()) {
            return Err(HistoryLedgerError::DuplicateEntry(entry.id()));
        }
        state.ids.insert(entry.id());
        state.entries.push(entry.clone());
        Ok(())
    }

    async fn remove(&self, id: HistoryEntryId) -> HistoryLedgerResult<()> {
        let mut state = self.write_lock()?;
        if !state.ids.remove(&id) {
            return Err(HistoryLedgerError::NotFound(id));
        }
        state.entries.retain(|entry| entry.id() != id);
        Ok(())
    }

    async fn purge_completions(&self, task_id: TaskId) -> HistoryLedgerResult<usize> {
        let mut state = self.write_lock()?;
        let before = state.entries.len();
        let purged_ids: Vec<HistoryEntryId> = state
            .entries
            .iter()
            .filter(|entry| entry.task_id() == task_id && entry.is_completion())
            .map(HistoryEntry::id)
            .collect();
        for id in &purged_ids {
            state.ids.remove(id);
        }
        state
            .entries
            .retain(|entry| !(entry.task_id() == task_id && entry.is_completion()));
        Ok(before - state.entries.len())
    }

    async fn find_by_task(
        &self,
        task_id: TaskId,
        newest_first: bool,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        let mut entries = self.collect(|entry| entry.task_id() == task_id)?;
        if newest_first {
            entries.reverse();
        }
        Ok(entries)
    }

    async fn find_by_owner(&self, owner: UserId) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.collect(|entry| entry.user_id() == owner)
    }

    async fn completions_by_owner(
        &self,
        owner: UserId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        let mut entries = self.collect(|entry| entry.user_id() == owner && entry.is_completion())?;
        entries.reverse();
        Ok(entries)
    }

    async fn completions_for_task(
        &self,
        task_id: TaskId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.collect(|entry| entry.task_id() == task_id && entry.is_completion())
    }
}
