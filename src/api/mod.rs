//! JSON-oriented facade over the task and notification services.
//!
//! The HTTP routing layer lives outside this crate; these types define the
//! wire shapes it serves and the error-translation policy it relies on.
//! Internal failures never escape as raw errors: every operation returns
//! either a serializable response body or an [`ApiError`] carrying a
//! status code and an `{error: message}` payload.

mod dto;
mod error;
mod notifications;
mod tasks;

pub use dto::{
    CategoryResponse, CompletedTaskResponse, HistoryEntryResponse, NotificationResponse,
    SnapshotResponse, StatsResponse, StatusResponse, SuccessResponse, TaskPayload, TaskResponse,
    UnreadCountResponse,
};
pub use error::{ApiError, ErrorBody};
pub use notifications::NotificationApi;
pub use tasks::TaskApi;
