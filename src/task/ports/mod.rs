//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod ledger;
pub mod repository;

pub use directory::{CategoryDirectory, DirectoryError, DirectoryResult, UserDirectory};
pub use ledger::{HistoryLedger, HistoryLedgerError, HistoryLedgerResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
