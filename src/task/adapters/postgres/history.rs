//! `PostgreSQL` implementation of the history ledger.

use super::{models::HistoryEntryRow, schema::history_entries, task::PgPool};
use crate::task::{
    domain::{
        HistoryAction, HistoryEntry, HistoryEntryId, PersistedHistoryData, TaskId, TaskSnapshot,
        UserId,
    },
    ports::{HistoryLedger, HistoryLedgerError, HistoryLedgerResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed history ledger.
#[derive(Debug, Clone)]
pub struct PostgresHistoryLedger {
    pool: PgPool,
}

impl PostgresHistoryLedger {
    /// Creates a new ledger from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> HistoryLedgerResult<T>
    where
        F: FnOnce(&mut PgConnection) -> HistoryLedgerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(HistoryLedgerError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(HistoryLedgerError::persistence)?
    }
}

fn to_row(entry: &HistoryEntry) -> HistoryLedgerResult<HistoryEntryRow> {
    let action = serde_json::to_value(entry.action()).map_err(HistoryLedgerError::persistence)?;
    let snapshot = entry
        .snapshot()
        .map(serde_json::to_value)
        .transpose()
        .map_err(HistoryLedgerError::persistence)?;

    Ok(HistoryEntryRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        user_id: entry.user_id().into_inner(),
        action,
        is_completion: entry.is_completion(),
        recorded_at: entry.recorded_at(),
        snapshot,
    })
}

fn row_to_entry(row: HistoryEntryRow) -> HistoryLedgerResult<HistoryEntry> {
    let HistoryEntryRow {
        id,
        task_id,
        user_id,
        action: persisted_action,
        recorded_at,
        snapshot: persisted_snapshot,
        ..
    } = row;

    let action = serde_json::from_value::<HistoryAction>(persisted_action)
        .map_err(HistoryLedgerError::persistence)?;
    let snapshot = persisted_snapshot
        .map(serde_json::from_value::<TaskSnapshot>)
        .transpose()
        .map_err(HistoryLedgerError::persistence)?;

    let data = PersistedHistoryData {
        id: HistoryEntryId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        user_id: UserId::from_uuid(user_id),
        action,
        recorded_at,
        snapshot,
    };
    Ok(HistoryEntry::from_persisted(data))
}

fn rows_to_entries(rows: Vec<HistoryEntryRow>) -> HistoryLedgerResult<Vec<HistoryEntry>> {
    rows.into_iter().map(row_to_entry).collect()
}

#[async_trait]
impl HistoryLedger for PostgresHistoryLedger {
    async fn append(&self, entry: &HistoryEntry) -> HistoryLedgerResult<()> {
        let entry_id = entry.id();
        let row = to_row(entry)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(history_entries::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        HistoryLedgerError::DuplicateEntry(entry_id)
                    }
                    _ => HistoryLedgerError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: HistoryEntryId) -> HistoryLedgerResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                history_entries::table.filter(history_entries::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(HistoryLedgerError::persistence)?;
            if affected == 0 {
                return Err(HistoryLedgerError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn purge_completions(&self, task_id: TaskId) -> HistoryLedgerResult<usize> {
        self.run_blocking(move |connection| {
            diesel::delete(
                history_entries::table
                    .filter(history_entries::task_id.eq(task_id.into_inner()))
                    .filter(history_entries::is_completion.eq(true)),
            )
            .execute(connection)
            .map_err(HistoryLedgerError::persistence)
        })
        .await
    }

    async fn find_by_task(
        &self,
        task_id: TaskId,
        newest_first: bool,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.run_blocking(move |connection| {
            let query = history_entries::table
                .filter(history_entries::task_id.eq(task_id.into_inner()))
                .select(HistoryEntryRow::as_select());
            let rows = if newest_first {
                query
                    .order(history_entries::recorded_at.desc())
                    .load::<HistoryEntryRow>(connection)
            } else {
                query
                    .order(history_entries::recorded_at.asc())
                    .load::<HistoryEntryRow>(connection)
            }
            .map_err(HistoryLedgerError::persistence)?;
            rows_to_entries(rows)
        })
        .await
    }

    async fn find_by_owner(&self, owner: UserId) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.run_blocking(move |connection| {
            let rows = history_entries::table
                .filter(history_entries::user_id.eq(owner.into_inner()))
                .order(history_entries::recorded_at.asc())
                .select(HistoryEntryRow::as_select())
                .load::<HistoryEntryRow>(connection)
                .map_err(HistoryLedgerError::persistence)?;
            rows_to_entries(rows)
        })
        .await
    }

    async fn completions_by_owner(
        &self,
        owner: UserId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.run_blocking(move |connection| {
            let rows = history_entries::table
                .filter(history_entries::user_id.eq(owner.into_inner()))
                .filter(history_entries::is_completion.eq(true))
                .order(history_entries::recorded_at.desc())
                .select(HistoryEntryRow::as_select())
                .load::<HistoryEntryRow>(connection)
                .map_err(HistoryLedgerError::persistence)?;
            rows_to_entries(rows)
        })
        .await
    }

    async fn completions_for_task(
        &self,
        task_id: TaskId,
    ) -> HistoryLedgerResult<Vec<HistoryEntry>> {
        self.run_blocking(move |connection| {
            let rows = history_entries::table
                .filter(history_entries::task_id.eq(task_id.into_inner()))
                .filter(history_entries::is_completion.eq(true))
                .order(history_entries::recorded_at.asc())
                .select(HistoryEntryRow::as_select())
                .load::<HistoryEntryRow>(connection)
                .map_err(HistoryLedgerError::persistence)?;
            rows_to_entries(rows)
        })
        .await
    }
}
