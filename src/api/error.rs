//! Error payloads surfaced at the API boundary.

use crate::notification::services::NotificationServiceError;
use crate::task::services::TaskLifecycleError;
use serde::Serialize;

/// HTTP-oriented error carrying a status code and a message.
///
/// Raw storage errors never reach the external boundary; they are folded
/// into a structured `{error: message}` payload here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: u16,
    message: String,
}

impl ApiError {
    /// Creates a 404 not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: 404,
            message: message.into(),
        }
    }

    /// Creates a 500 internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the serializable `{error: message}` body.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
        }
    }
}

/// The JSON error body shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::NotFound(_) => Self::not_found("Task not found or not authorized"),
            TaskLifecycleError::UnknownUser(_) => Self::not_found("User not found"),
            other => Self::internal(format!("Error processing task: {other}")),
        }
    }
}

impl From<NotificationServiceError> for ApiError {
    fn from(err: NotificationServiceError) -> Self {
        match err {
            NotificationServiceError::NotFound(_) => Self::not_found("Notification not found"),
            NotificationServiceError::UnknownUser(_) => Self::not_found("User not found"),
            other => Self::internal(format!("Error processing notification: {other}")),
        }
    }
}
