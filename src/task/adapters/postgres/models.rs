//! Diesel row models for task and history persistence.

use super::schema::{history_entries, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for task records, shared by queries, inserts, and full-record
/// updates.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// Category reference JSON payload.
    pub category: Option<Value>,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: Option<String>,
    /// Start date.
    pub start_date: NaiveDate,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Priority storage string.
    pub priority: String,
    /// Status storage string.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for history ledger entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = history_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Recorded task identifier.
    pub task_id: uuid::Uuid,
    /// Acting user identifier.
    pub user_id: uuid::Uuid,
    /// Action JSON payload.
    pub action: Value,
    /// Denormalized completion marker.
    pub is_completion: bool,
    /// Entry timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Optional completion snapshot JSON payload.
    pub snapshot: Option<Value>,
}
