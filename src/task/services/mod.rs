//! Application services for task lifecycle orchestration.

mod lifecycle;
mod sweeper;

pub use lifecycle::{
    CompletedTask, TaskChanges, TaskDraft, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, TaskStats,
};
pub use sweeper::OverdueSweeper;
