//! `PostgreSQL` adapters for task and history persistence.

mod history;
mod models;
mod schema;
mod task;

pub use history::PostgresHistoryLedger;
pub use task::{PgPool, PostgresTaskRepository};
